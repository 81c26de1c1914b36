//! Product modal fill targets.
//!
//! Each semantic field maps to exactly one `data-*` hook and one way of
//! reading/writing it, so the binding layer never guesses from attribute names.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSink {
    /// `textContent`
    Text,
    /// Form control `value`
    Value,
    /// `<img src>`
    ImageSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalField {
    Name,
    Image,
    Price,
    Total,
    Quantity,
    Note,
}

impl ModalField {
    pub const ALL: [ModalField; 6] = [
        ModalField::Name,
        ModalField::Image,
        ModalField::Price,
        ModalField::Total,
        ModalField::Quantity,
        ModalField::Note,
    ];

    pub const fn selector(self) -> &'static str {
        match self {
            ModalField::Name => "[data-modal-name]",
            ModalField::Image => "[data-modal-image]",
            ModalField::Price => "[data-modal-price]",
            ModalField::Total => "[data-modal-total]",
            ModalField::Quantity => "[data-modal-qty]",
            ModalField::Note => "[data-modal-note]",
        }
    }

    pub const fn sink(self) -> FieldSink {
        match self {
            ModalField::Image => FieldSink::ImageSource,
            ModalField::Note => FieldSink::Value,
            ModalField::Name | ModalField::Price | ModalField::Total | ModalField::Quantity => {
                FieldSink::Text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_has_a_distinct_hook() {
        let mut selectors: Vec<_> = ModalField::ALL.iter().map(|f| f.selector()).collect();
        selectors.sort();
        selectors.dedup();
        assert_eq!(selectors.len(), ModalField::ALL.len());
        assert_eq!(ModalField::Note.sink(), FieldSink::Value);
        assert_eq!(ModalField::Image.sink(), FieldSink::ImageSource);
        assert_eq!(ModalField::Total.sink(), FieldSink::Text);
    }
}
