use std::collections::BTreeSet;

use nalgebra::DMatrix;

/// One-hot encoded categorical block with its generated column names
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoding {
    /// Distinct category values in column order (lexicographic)
    pub categories: Vec<String>,
    /// `<prefix>_<value>` for every category, same order
    pub names: Vec<String>,
    /// One row per input value, exactly one 1.0 per row
    pub matrix: DMatrix<f64>,
}

/// One-hot encode `values`, naming columns `<prefix>_<value>`.
///
/// The category set is closed over `values`; columns are sorted so the
/// layout does not depend on input order.
pub fn one_hot_encode<S: AsRef<str>>(values: &[S], prefix: &str) -> OneHotEncoding {
    let categories: Vec<String> = values
        .iter()
        .map(|v| v.as_ref().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut matrix = DMatrix::zeros(values.len(), categories.len());
    for (row, value) in values.iter().enumerate() {
        // categories is sorted and holds every input value
        if let Ok(col) = categories.binary_search_by(|c| c.as_str().cmp(value.as_ref())) {
            matrix[(row, col)] = 1.0;
        }
    }

    let names = categories
        .iter()
        .map(|c| format!("{}_{}", prefix, c))
        .collect();

    OneHotEncoding {
        categories,
        names,
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_columns_and_rows() {
        let encoded = one_hot_encode(&["Tech", "Tech", "Energy"], "Sector");

        assert_eq!(encoded.names, vec!["Sector_Energy", "Sector_Tech"]);
        assert_eq!(encoded.matrix.shape(), (3, 2));
        assert_eq!(encoded.matrix.row(0).iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0]);
        assert_eq!(encoded.matrix.row(1).iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0]);
        assert_eq!(encoded.matrix.row(2).iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0]);

        for row in encoded.matrix.row_iter() {
            assert_eq!(row.sum(), 1.0);
        }
    }

    #[test]
    fn test_layout_independent_of_input_order() {
        let a = one_hot_encode(&["Utilities", "Energy", "Health"], "Sector");
        let b = one_hot_encode(&["Health", "Utilities", "Energy"], "Sector");
        assert_eq!(a.names, b.names);
        assert_eq!(a.categories, vec!["Energy", "Health", "Utilities"]);
    }

    #[test]
    fn test_empty_input() {
        let encoded = one_hot_encode::<&str>(&[], "Sector");
        assert!(encoded.names.is_empty());
        assert_eq!(encoded.matrix.shape(), (0, 0));
    }
}
