//! Product modal controller.
//!
//! Lifecycle: `Closed → Loading → Open → Closed`. Closing always wipes the
//! transient state (quantity, note, selections) so a reopened modal starts clean.

use crate::options::{OptionBoard, OptionGroup, Toggle};
use thiserror::Error;
use tracing::debug;
use zs_order_types::{LineItem, Quantity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Loading { slug: String },
    Open,
}

/// Product facts read from the modal markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSheet {
    pub slug: String,
    pub name: String,
    pub image: String,
    pub base_price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    #[error("product modal is not open")]
    NotOpen,
    #[error("no modal load pending for `{0}`")]
    NotLoading(String),
    #[error("Vui lòng chọn {title}")]
    MissingRequired { group: String, title: String },
}

/// Where a validated line should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Append(LineItem),
    Replace { index: usize, item: LineItem },
}

impl Submission {
    pub fn item(&self) -> &LineItem {
        match self {
            Submission::Append(item) | Submission::Replace { item, .. } => item,
        }
    }
}

#[derive(Debug, Clone)]
struct EditTarget {
    index: usize,
    original: LineItem,
}

#[derive(Debug)]
pub struct ProductModal {
    phase: ModalPhase,
    sheet: Option<ProductSheet>,
    board: OptionBoard,
    quantity: Quantity,
    note: String,
    editing: Option<EditTarget>,
}

impl Default for ProductModal {
    fn default() -> Self {
        Self {
            phase: ModalPhase::Closed,
            sheet: None,
            board: OptionBoard::default(),
            quantity: Quantity::default(),
            note: String::new(),
            editing: None,
        }
    }
}

impl ProductModal {
    pub fn phase(&self) -> &ModalPhase {
        &self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == ModalPhase::Open
    }

    pub fn sheet(&self) -> Option<&ProductSheet> {
        self.sheet.as_ref()
    }

    pub fn board(&self) -> &OptionBoard {
        &self.board
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// Start fetching the markup for `slug`. Returns `false` while another modal
    /// is loading or open.
    pub fn begin_loading(&mut self, slug: &str) -> bool {
        if self.phase != ModalPhase::Closed {
            return false;
        }
        debug!("loading product modal {}", slug);
        self.phase = ModalPhase::Loading {
            slug: slug.to_owned(),
        };
        true
    }

    /// Like `begin_loading`, but submitting will replace cart line `index`.
    pub fn begin_edit(&mut self, slug: &str, index: usize, original: LineItem) -> bool {
        if !self.begin_loading(slug) {
            return false;
        }
        self.editing = Some(EditTarget { index, original });
        true
    }

    pub fn open(&mut self, sheet: ProductSheet, groups: Vec<OptionGroup>) -> Result<(), ModalError> {
        match &self.phase {
            ModalPhase::Loading { slug } if *slug == sheet.slug => {}
            _ => return Err(ModalError::NotLoading(sheet.slug)),
        }

        self.board = OptionBoard::new(groups);
        self.quantity = Quantity::default();
        self.note.clear();
        if let Some(edit) = &self.editing {
            self.board.apply(&edit.original.options);
            self.quantity = edit.original.quantity;
            self.note = edit.original.note.clone();
        }
        self.sheet = Some(sheet);
        self.phase = ModalPhase::Open;
        Ok(())
    }

    /// Loading failed; nothing was shown.
    pub fn fail(&mut self) {
        self.reset();
    }

    pub fn toggle_option(&mut self, group: &str, label: &str) -> Result<Toggle, ModalError> {
        if !self.is_open() {
            return Err(ModalError::NotOpen);
        }
        let Some(g) = self.board.group_index(group) else {
            return Ok(Toggle::Ignored);
        };
        let Some(i) = self.board.item_index(g, label) else {
            return Ok(Toggle::Ignored);
        };
        Ok(self.board.toggle(g, i))
    }

    /// Quantity stepper; clamps at both ends, never removes.
    pub fn step_quantity(&mut self, delta: i64) -> Quantity {
        self.quantity = self.quantity.step(delta);
        self.quantity
    }

    pub fn set_note(&mut self, note: &str) {
        self.note = note.to_owned();
    }

    pub fn running_total(&self) -> u64 {
        let base = self.sheet.as_ref().map_or(0, |s| s.base_price);
        zs_pricing::compute_total(base, &self.board.selected_options(), self.quantity)
    }

    pub fn validate(&self) -> Result<(), ModalError> {
        match self.board.first_missing_required() {
            Some(group) => Err(ModalError::MissingRequired {
                group: group.name.clone(),
                title: group.title.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Validate and build the cart line. The modal stays open; call `close` afterwards.
    pub fn submit(&self) -> Result<Submission, ModalError> {
        let Some(sheet) = self.sheet.as_ref().filter(|_| self.is_open()) else {
            return Err(ModalError::NotOpen);
        };
        self.validate()?;

        let item = LineItem::new(
            sheet.name.clone(),
            sheet.image.clone(),
            sheet.base_price,
            self.board.selected_options(),
            self.quantity,
        )
        .with_note(self.note.trim())
        .with_slug(sheet.slug.clone());

        Ok(match &self.editing {
            Some(edit) => Submission::Replace {
                index: edit.index,
                item,
            },
            None => Submission::Append(item),
        })
    }

    pub fn close(&mut self) {
        debug!("closing product modal");
        self.reset();
    }

    fn reset(&mut self) {
        self.board.clear();
        self.quantity = Quantity::default();
        self.note.clear();
        self.editing = None;
        self.sheet = None;
        self.phase = ModalPhase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OptionItem, OptionKind};

    fn sheet() -> ProductSheet {
        ProductSheet {
            slug: "tra-sua".into(),
            name: "Trà sữa".into(),
            image: "/img/ts.png".into(),
            base_price: 30000,
        }
    }

    fn groups() -> Vec<OptionGroup> {
        let item = |label: &str, price| OptionItem {
            label: label.into(),
            price,
        };
        vec![
            OptionGroup::from_section(
                "size",
                "Kích cỡ",
                OptionKind::Single,
                "Bắt buộc",
                vec![item("M", 0), item("L", 5000)],
            ),
            OptionGroup::from_section(
                "topping",
                "Topping",
                OptionKind::Multi,
                "Tối đa 2",
                vec![item("Pearl", 3000), item("Jelly", 3000), item("Pudding", 4000)],
            ),
        ]
    }

    fn open_modal() -> ProductModal {
        let mut modal = ProductModal::default();
        assert!(modal.begin_loading("tra-sua"));
        modal.open(sheet(), groups()).unwrap();
        modal
    }

    #[test]
    fn open_requires_matching_load() {
        let mut modal = ProductModal::default();
        assert_eq!(
            modal.open(sheet(), groups()),
            Err(ModalError::NotLoading("tra-sua".into()))
        );
        assert!(modal.begin_loading("other"));
        assert!(!modal.begin_loading("tra-sua"));
        assert!(modal.open(sheet(), groups()).is_err());
        modal.fail();
        assert_eq!(modal.phase(), &ModalPhase::Closed);
    }

    #[test]
    fn quantity_stepper_clamps() {
        let mut modal = open_modal();
        assert_eq!(modal.step_quantity(-1).get(), 1);
        for _ in 0..120 {
            modal.step_quantity(1);
        }
        assert_eq!(modal.quantity().get(), 99);
    }

    #[test]
    fn submit_halts_on_missing_required_group() {
        let mut modal = open_modal();
        modal.toggle_option("topping", "Pearl").unwrap();
        let err = modal.submit().unwrap_err();
        assert_eq!(
            err,
            ModalError::MissingRequired {
                group: "size".into(),
                title: "Kích cỡ".into()
            }
        );
        assert_eq!(err.to_string(), "Vui lòng chọn Kích cỡ");
    }

    #[test]
    fn submit_builds_consistent_line() {
        let mut modal = open_modal();
        modal.toggle_option("size", "L").unwrap();
        modal.toggle_option("topping", "Pearl").unwrap();
        modal.toggle_option("topping", "Jelly").unwrap();
        assert_eq!(
            modal.toggle_option("topping", "Pudding").unwrap(),
            Toggle::Ignored
        );
        modal.step_quantity(1);
        modal.set_note("  ít đá ");

        assert_eq!(modal.running_total(), (30000 + 5000 + 6000) * 2);

        let Submission::Append(item) = modal.submit().unwrap() else {
            panic!("expected append");
        };
        assert_eq!(item.total, 82000);
        assert_eq!(item.options_price, 11000);
        assert_eq!(item.note, "ít đá");
        assert_eq!(item.slug.as_deref(), Some("tra-sua"));
        assert!(item.is_consistent());
    }

    #[test]
    fn close_resets_transient_state() {
        let mut modal = open_modal();
        modal.toggle_option("size", "L").unwrap();
        modal.step_quantity(3);
        modal.set_note("no sugar");
        modal.close();

        assert!(!modal.is_open());
        assert_eq!(modal.toggle_option("size", "M"), Err(ModalError::NotOpen));

        assert!(modal.begin_loading("tra-sua"));
        modal.open(sheet(), groups()).unwrap();
        assert_eq!(modal.quantity().get(), 1);
        assert_eq!(modal.note(), "");
        assert!(modal.board().selected_options().is_empty());
    }

    #[test]
    fn edit_prefills_and_replaces() {
        let mut modal = open_modal();
        modal.toggle_option("size", "L").unwrap();
        modal.toggle_option("topping", "Jelly").unwrap();
        modal.step_quantity(2);
        let original = modal.submit().unwrap().item().clone();
        modal.close();

        assert!(modal.begin_edit("tra-sua", 4, original.clone()));
        modal.open(sheet(), groups()).unwrap();
        assert_eq!(modal.quantity().get(), 3);
        assert_eq!(modal.board().selected_options(), original.options);

        modal.step_quantity(-1);
        match modal.submit().unwrap() {
            Submission::Replace { index, item } => {
                assert_eq!(index, 4);
                assert_eq!(item.quantity.get(), 2);
                assert_eq!(item.total, (30000 + 5000 + 3000) * 2);
            }
            other => panic!("expected replace, got {:?}", other),
        }
    }
}
