//! Domain types representing transaction categories.

use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::transaction::TransactionKind;

/// Groups transactions for reporting. Owned by the category manager; the
/// ledger only ever holds a [`CategoryId`] pointing at one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub is_predefined: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            icon: String::new(),
            kind,
            is_predefined: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    fn predefined(name: &str, icon: &str, kind: TransactionKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            icon: icon.into(),
            kind,
            is_predefined: true,
        }
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        if self.icon.is_empty() {
            format!("{} ({})", self.name, self.kind)
        } else {
            format!("{} {} ({})", self.icon, self.name, self.kind)
        }
    }
}

/// Categories seeded into an empty category table.
pub fn predefined_categories() -> Vec<Category> {
    use TransactionKind::{Expense, Income};
    vec![
        Category::predefined("餐饮", "🍜", Expense),
        Category::predefined("交通", "🚇", Expense),
        Category::predefined("购物", "🛒", Expense),
        Category::predefined("娱乐", "🎬", Expense),
        Category::predefined("医疗", "🏥", Expense),
        Category::predefined("工资", "💰", Income),
        Category::predefined("奖金", "🎁", Income),
    ]
}
