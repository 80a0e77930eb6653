use crate::matching::mapping::ColumnMapping;
use crate::matching::normalize::normalize_column_name;

/// Name-only column mapping.
///
/// Each A column, in order, takes the first free B column that matches it
/// exactly, then case-insensitively, then by normalized name. A B column
/// is used at most once.
#[must_use]
pub fn simple_column_mapping<S: AsRef<str>>(columns_a: &[S], columns_b: &[S]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    let mut used = vec![false; columns_b.len()];

    let lowered_b: Vec<String> = columns_b.iter().map(|c| c.as_ref().to_lowercase()).collect();
    let normalized_b: Vec<String> = columns_b
        .iter()
        .map(|c| normalize_column_name(c.as_ref()))
        .collect();

    for column_a in columns_a {
        let column_a = column_a.as_ref();
        let lowered_a = column_a.to_lowercase();
        let normalized_a = normalize_column_name(column_a);

        let free = |i: &usize| !used[*i];
        let found = (0..columns_b.len())
            .filter(free)
            .find(|&i| columns_b[i].as_ref() == column_a)
            .or_else(|| {
                (0..columns_b.len())
                    .filter(free)
                    .find(|&i| lowered_b[i] == lowered_a)
            })
            .or_else(|| {
                (0..columns_b.len())
                    .filter(free)
                    .find(|&i| !normalized_a.is_empty() && normalized_b[i] == normalized_a)
            });

        if let Some(i) = found {
            if mapping
                .insert(column_a.to_string(), columns_b[i].as_ref().to_string())
                .is_ok()
            {
                used[i] = true;
            }
        }
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_levels() {
        let a = ["id", "NOME", "Preço Unitário", "extra"];
        let b = ["preco_unitario", "nome", "id", "other"];
        let mapping = simple_column_mapping(&a, &b);

        assert_eq!(mapping.target("id"), Some("id"));
        assert_eq!(mapping.target("NOME"), Some("nome"));
        assert_eq!(mapping.target("Preço Unitário"), Some("preco_unitario"));
        assert_eq!(mapping.target("extra"), None);
        assert_eq!(mapping.sources(), vec!["id", "NOME", "Preço Unitário"]);
    }

    #[test]
    fn test_exact_match_wins_over_earlier_loose_match() {
        let a = ["Valor"];
        let b = ["valor", "Valor"];
        let mapping = simple_column_mapping(&a, &b);
        assert_eq!(mapping.target("Valor"), Some("Valor"));
    }

    #[test]
    fn test_each_target_used_once() {
        let a = ["valor", "VALOR"];
        let b = ["Valor"];
        let mapping = simple_column_mapping(&a, &b);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.target("valor"), Some("Valor"));
    }
}
