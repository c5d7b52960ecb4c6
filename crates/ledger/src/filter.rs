use crate::book::Book;
use crate::numeric::numeric;

/// Title search plus an optional inclusive price range.
///
/// A book whose price does not parse is compared as price `0`, so it fails
/// any positive lower bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    search: String,
    min_price: Option<f64>,
    max_price: Option<f64>,
}

impl Filter {
    /// Build a filter. The search term is trimmed and matched case-insensitively.
    pub fn new(search: &str, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            min_price,
            max_price,
        }
    }

    /// Normalized (trimmed, lowercased) search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn min_price(&self) -> Option<f64> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<f64> {
        self.max_price
    }

    /// Whether the filter lets every book through.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.min_price.is_none() && self.max_price.is_none()
    }

    /// Same price bounds, no search term.
    #[must_use]
    pub fn without_search(&self) -> Self {
        Self {
            search: String::new(),
            ..self.clone()
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        let matches_search =
            self.search.is_empty() || book.title.to_lowercase().contains(&self.search);
        if !matches_search {
            return false;
        }

        let price = numeric(&book.price);
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        !self.max_price.is_some_and(|max| price > max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnRegistry;

    fn book(title: &str, price: &str) -> Book {
        let mut book = Book::blank(1, &ColumnRegistry::default());
        book.title = title.to_string();
        book.price = price.to_string();
        book
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&book("", "")));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filter = Filter::new("  TOÁN ", None, None);
        assert_eq!(filter.search(), "toán");
        assert!(filter.matches(&book("Toán 5", "")));
        assert!(filter.matches(&book("Bài tập toán nâng cao", "")));
        assert!(!filter.matches(&book("Văn 3", "")));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let filter = Filter::new("", Some(30000.0), Some(50000.0));
        assert!(filter.matches(&book("a", "30000")));
        assert!(filter.matches(&book("a", "50000")));
        assert!(!filter.matches(&book("a", "50001")));
        assert!(!filter.matches(&book("a", "29999")));
    }

    #[test]
    fn test_unparseable_price_compares_as_zero() {
        let min_only = Filter::new("", Some(1.0), None);
        assert!(!min_only.matches(&book("a", "liên hệ")));

        let max_only = Filter::new("", None, Some(100.0));
        assert!(max_only.matches(&book("a", "liên hệ")));
    }

    #[test]
    fn test_without_search_keeps_prices() {
        let filter = Filter::new("abc", Some(1.0), None).without_search();
        assert_eq!(filter.search(), "");
        assert_eq!(filter.min_price(), Some(1.0));
    }
}
