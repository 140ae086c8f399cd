use std::sync::Arc;

use crate::item::AutofillItem;

/// What the user left the widget with
#[derive(Debug)]
pub struct AutofillOutput {
    /// Whether the user aborted instead of accepting
    pub is_abort: bool,
    /// The text in the input field
    pub query: String,
    /// The selected items, in selection order
    pub selected: Vec<Arc<dyn AutofillItem>>,
}
