use crate::column::{ColumnFamily, ColumnRegistry};
use crate::numeric::numeric;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Value a choice field (category, brand) receives when the operator asks
/// to type a free-text entry instead of picking from the list.
pub const CUSTOM_SENTINEL: &str = "custom";

/// Preset categories offered for the `mang` field.
pub const CATEGORY_OPTIONS: [&str; 10] = [
    "Giáo khoa",
    "Tham khảo",
    "Tiểu thuyết",
    "Khoa học",
    "Lịch sử",
    "Văn học",
    "Ngoại ngữ",
    "Công nghệ",
    "Kinh tế",
    "Sách thiếu nhi",
];

/// Selects one editable field of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Stt,
    Title,
    Brand,
    Price,
    Category,
    Stock,
    Returns,
    Note,
    /// A dynamic round or arrived-stock column.
    Column(String),
}

impl Field {
    /// Parse a wire field name. Anything that is not a fixed field is taken
    /// as a column identifier; the ledger checks it against the registry.
    pub fn parse(name: &str) -> Self {
        match name {
            "stt" => Field::Stt,
            "tenSach" => Field::Title,
            "hangSach" => Field::Brand,
            "giaMoi" => Field::Price,
            "mang" => Field::Category,
            "tanKho" => Field::Stock,
            "traLai" => Field::Returns,
            "ghiChu" => Field::Note,
            other => Field::Column(other.to_string()),
        }
    }

    /// Key used for this field in the JSON document.
    pub fn wire_name(&self) -> &str {
        match self {
            Field::Stt => "stt",
            Field::Title => "tenSach",
            Field::Brand => "hangSach",
            Field::Price => "giaMoi",
            Field::Category => "mang",
            Field::Stock => "tanKho",
            Field::Returns => "traLai",
            Field::Note => "ghiChu",
            Field::Column(name) => name,
        }
    }

    /// Whether the field accepts [`CUSTOM_SENTINEL`].
    pub fn is_choice(&self) -> bool {
        matches!(self, Field::Category | Field::Brand)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One order line of the ledger.
///
/// Quantities and prices are kept as entered; see [`crate::numeric`] for how
/// they are read when totals are computed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BookWire")]
pub struct Book {
    /// Stable identity, unique within a ledger.
    pub id: u64,
    /// Display sequence number; editable and not necessarily unique.
    pub stt: u64,
    pub title: String,
    pub brand: String,
    pub price: String,
    pub category: String,
    pub stock: String,
    pub returns: String,
    pub note: String,
    rounds: IndexMap<String, String>,
    arrivals: IndexMap<String, String>,
    custom_category: bool,
    custom_brand: bool,
}

impl Book {
    /// An empty line carrying one empty value per registered column.
    pub fn blank(id: u64, columns: &ColumnRegistry) -> Self {
        let mut book = Book {
            id,
            stt: id,
            ..Book::default()
        };
        book.sync_columns(columns);
        book
    }

    /// Raw value of a dynamic column, if the line carries it.
    pub fn column(&self, name: &str) -> Option<&str> {
        self.rounds
            .get(name)
            .or_else(|| self.arrivals.get(name))
            .map(String::as_str)
    }

    /// Dynamic column values of one family, in the order they were added.
    pub fn columns(&self, family: ColumnFamily) -> &IndexMap<String, String> {
        match family {
            ColumnFamily::Round => &self.rounds,
            ColumnFamily::Arrived => &self.arrivals,
        }
    }

    /// Numeric value of a dynamic column; missing or non-numeric reads as zero.
    pub fn quantity(&self, name: &str) -> f64 {
        self.column(name).map_or(0.0, numeric)
    }

    /// Raw value of any field as text.
    pub fn get(&self, field: &Field) -> Option<String> {
        Some(match field {
            Field::Stt => self.stt.to_string(),
            Field::Title => self.title.clone(),
            Field::Brand => self.brand.clone(),
            Field::Price => self.price.clone(),
            Field::Category => self.category.clone(),
            Field::Stock => self.stock.clone(),
            Field::Returns => self.returns.clone(),
            Field::Note => self.note.clone(),
            Field::Column(name) => return self.column(name).map(str::to_string),
        })
    }

    /// Whether the operator picked free-text entry for `field` and has not
    /// typed the value yet.
    pub fn awaiting_free_text(&self, field: &Field) -> bool {
        match field {
            Field::Category => self.custom_category,
            Field::Brand => self.custom_brand,
            _ => false,
        }
    }

    /// Whether the category is one of [`CATEGORY_OPTIONS`].
    pub fn has_preset_category(&self) -> bool {
        CATEGORY_OPTIONS.contains(&self.category.as_str())
    }

    /// Store `value` into `field`. Column fields must already be present.
    pub(crate) fn set(&mut self, field: &Field, value: &str) {
        if field.is_choice() && value == CUSTOM_SENTINEL {
            match field {
                Field::Category => {
                    self.category.clear();
                    self.custom_category = true;
                }
                Field::Brand => {
                    self.brand.clear();
                    self.custom_brand = true;
                }
                _ => {}
            }
            return;
        }

        match field {
            Field::Stt => self.stt = numeric(value).max(0.0) as u64,
            Field::Title => self.title = value.to_string(),
            Field::Brand => {
                self.brand = value.to_string();
                self.custom_brand = false;
            }
            Field::Price => self.price = value.to_string(),
            Field::Category => {
                self.category = value.to_string();
                self.custom_category = false;
            }
            Field::Stock => self.stock = value.to_string(),
            Field::Returns => self.returns = value.to_string(),
            Field::Note => self.note = value.to_string(),
            Field::Column(name) => {
                if let Some(slot) = self
                    .rounds
                    .get_mut(name)
                    .or_else(|| self.arrivals.get_mut(name))
                {
                    *slot = value.to_string();
                }
            }
        }
    }

    /// Make the dynamic fields match `columns` exactly: missing ones are
    /// added empty, unregistered ones are dropped, order follows the registry.
    pub(crate) fn sync_columns(&mut self, columns: &ColumnRegistry) {
        self.rounds = reorder(&mut self.rounds, columns.rounds());
        self.arrivals = reorder(&mut self.arrivals, columns.arrivals());
    }

    pub(crate) fn insert_column(&mut self, family: ColumnFamily, name: &str) {
        let map = match family {
            ColumnFamily::Round => &mut self.rounds,
            ColumnFamily::Arrived => &mut self.arrivals,
        };
        map.entry(name.to_string()).or_default();
    }

    pub(crate) fn remove_column(&mut self, name: &str) {
        self.rounds.shift_remove(name);
        self.arrivals.shift_remove(name);
    }
}

fn reorder(values: &mut IndexMap<String, String>, order: &[String]) -> IndexMap<String, String> {
    order
        .iter()
        .map(|name| {
            let value = values.swap_remove(name).unwrap_or_default();
            (name.clone(), value)
        })
        .collect()
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(9 + self.rounds.len() + self.arrivals.len()))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("stt", &self.stt)?;
        map.serialize_entry("tenSach", &self.title)?;
        map.serialize_entry("hangSach", &self.brand)?;
        map.serialize_entry("giaMoi", &self.price)?;
        map.serialize_entry("mang", &self.category)?;
        map.serialize_entry("tanKho", &self.stock)?;
        map.serialize_entry("traLai", &self.returns)?;
        map.serialize_entry("ghiChu", &self.note)?;
        for (name, value) in self.rounds.iter().chain(&self.arrivals) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Lenient shape of a record on the wire: fixed keys may be strings or
/// numbers, and dynamic columns arrive as extra top-level keys.
#[derive(Deserialize)]
struct BookWire {
    #[serde(default, deserialize_with = "lenient_int")]
    id: u64,
    #[serde(default, deserialize_with = "lenient_int")]
    stt: u64,
    #[serde(default, rename = "tenSach", deserialize_with = "lenient_text")]
    title: String,
    #[serde(default, rename = "hangSach", deserialize_with = "lenient_text")]
    brand: String,
    #[serde(default, rename = "giaMoi", deserialize_with = "lenient_text")]
    price: String,
    #[serde(default, rename = "mang", deserialize_with = "lenient_text")]
    category: String,
    #[serde(default, rename = "tanKho", deserialize_with = "lenient_text")]
    stock: String,
    #[serde(default, rename = "traLai", deserialize_with = "lenient_text")]
    returns: String,
    #[serde(default, rename = "ghiChu", deserialize_with = "lenient_text")]
    note: String,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl From<BookWire> for Book {
    fn from(wire: BookWire) -> Self {
        let mut rounds = IndexMap::new();
        let mut arrivals = IndexMap::new();
        for (key, value) in wire.extra {
            match ColumnFamily::of(&key) {
                Some(ColumnFamily::Round) => {
                    rounds.insert(key, value_to_text(value));
                }
                Some(ColumnFamily::Arrived) => {
                    arrivals.insert(key, value_to_text(value));
                }
                None => {}
            }
        }

        Book {
            id: wire.id,
            stt: wire.stt,
            title: wire.title,
            brand: wire.brand,
            price: wire.price,
            category: wire.category,
            stock: wire.stock,
            returns: wire.returns,
            note: wire.note,
            rounds,
            arrivals,
            custom_category: false,
            custom_brand: false,
        }
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => numeric(&s),
        _ => 0.0,
    };
    Ok(value.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_parse_roundtrip_names() {
        for name in [
            "stt", "tenSach", "hangSach", "giaMoi", "mang", "tanKho", "traLai", "ghiChu", "lan4",
        ] {
            assert_eq!(Field::parse(name).wire_name(), name);
        }
        assert_eq!(Field::parse("lan4"), Field::Column("lan4".to_string()));
    }

    #[test]
    fn test_blank_carries_registered_columns() {
        let registry = ColumnRegistry::new(
            vec!["lan1".to_string(), "lan2".to_string()],
            vec!["hangDaLen1".to_string()],
        );
        let book = Book::blank(7, &registry);
        assert_eq!(book.id, 7);
        assert_eq!(book.stt, 7);
        assert_eq!(book.column("lan1"), Some(""));
        assert_eq!(book.column("lan2"), Some(""));
        assert_eq!(book.column("hangDaLen1"), Some(""));
        assert_eq!(book.column("lan3"), None);
    }

    #[test]
    fn test_deserialize_splits_dynamic_columns() {
        let book: Book = serde_json::from_value(json!({
            "id": 3,
            "stt": "4",
            "tenSach": "Toán 5",
            "giaMoi": 50000,
            "lan1": "5",
            "lan2": 2,
            "hangDaLen1": "1",
            "somethingElse": "ignored"
        }))
        .unwrap();

        assert_eq!(book.id, 3);
        assert_eq!(book.stt, 4);
        assert_eq!(book.title, "Toán 5");
        assert_eq!(book.price, "50000");
        assert_eq!(book.columns(ColumnFamily::Round).len(), 2);
        assert_eq!(book.column("lan2"), Some("2"));
        assert_eq!(book.columns(ColumnFamily::Arrived).get("hangDaLen1").unwrap(), "1");
        assert_eq!(book.column("somethingElse"), None);
    }

    #[test]
    fn test_serialize_is_flat() {
        let registry = ColumnRegistry::default();
        let mut book = Book::blank(1, &registry);
        book.set(&Field::Column("lan1".to_string()), "5");
        let value = serde_json::to_value(&book).unwrap();

        assert_eq!(value["id"], json!(1));
        assert_eq!(value["tenSach"], json!(""));
        assert_eq!(value["lan1"], json!("5"));
        assert_eq!(value["lan2"], json!(""));
    }

    #[test]
    fn test_custom_sentinel_is_not_content() {
        let mut book = Book::blank(1, &ColumnRegistry::default());
        book.set(&Field::Category, "Văn học");
        assert!(book.has_preset_category());

        book.set(&Field::Category, CUSTOM_SENTINEL);
        assert_eq!(book.category, "");
        assert!(book.awaiting_free_text(&Field::Category));

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["mang"], json!(""));

        book.set(&Field::Category, "Truyện tranh");
        assert_eq!(book.category, "Truyện tranh");
        assert!(!book.awaiting_free_text(&Field::Category));
        assert!(!book.has_preset_category());
    }

    #[test]
    fn test_custom_sentinel_is_plain_text_elsewhere() {
        let mut book = Book::blank(1, &ColumnRegistry::default());
        book.set(&Field::Note, CUSTOM_SENTINEL);
        assert_eq!(book.note, CUSTOM_SENTINEL);
    }

    #[test]
    fn test_sync_columns_adds_and_drops() {
        let mut book: Book = serde_json::from_value(json!({
            "id": 1, "lan1": "4", "lan9": "7"
        }))
        .unwrap();
        let registry =
            ColumnRegistry::new(vec!["lan1".to_string(), "lan2".to_string()], Vec::new());
        book.sync_columns(&registry);

        let keys: Vec<&String> = book.columns(ColumnFamily::Round).keys().collect();
        assert_eq!(keys, ["lan1", "lan2"]);
        assert_eq!(book.column("lan1"), Some("4"));
    }
}
