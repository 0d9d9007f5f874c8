use indexmap::IndexMap;

/// Label name to byte address, in definition order.
pub type LabelTable = IndexMap<String, u16>;

/// `#define` name to value, in definition order.
pub type DefineTable = IndexMap<String, u16>;

/// Name resolution used by the encoder.
pub trait Idents {
    fn get_val(&self, name: &str) -> Option<u16>;
}

/// Pass 1 only counts bytes, so every name resolves to a placeholder.
pub struct Sizing;

impl Idents for Sizing {
    fn get_val(&self, _name: &str) -> Option<u16> {
        Some(0)
    }
}

/// Defines shadow labels of the same name.
pub struct Symbols<'a> {
    pub labels: &'a LabelTable,
    pub defines: &'a DefineTable,
}

impl Idents for Symbols<'_> {
    fn get_val(&self, name: &str) -> Option<u16> {
        self.defines
            .get(name)
            .or_else(|| self.labels.get(name))
            .copied()
    }
}

#[test]
fn define_before_label() {
    let labels = LabelTable::from([("x".to_string(), 0x10), ("y".to_string(), 0x20)]);
    let defines = DefineTable::from([("x".to_string(), 0xff)]);
    let symbols = Symbols {
        labels: &labels,
        defines: &defines,
    };
    assert_eq!(symbols.get_val("x"), Some(0xff));
    assert_eq!(symbols.get_val("y"), Some(0x20));
    assert_eq!(symbols.get_val("z"), None);
    assert_eq!(Sizing.get_val("z"), Some(0));
}
