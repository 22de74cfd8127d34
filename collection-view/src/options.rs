use alloc::string::String;

use collection_virtualizer::{Result, VirtualizationMethod, VirtualizationOptions};

/// How many items a view lets the user select.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionType {
    None,
    #[default]
    Single,
    Multiple,
}

/// Pointer travel (in pixels) before a press on a reorderable view turns into a drag.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 5.0;

/// Configuration for a [`CollectionView`](crate::CollectionView).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionViewOptions {
    pub virtualization: VirtualizationOptions,
    pub selection_type: SelectionType,
    pub reorderable: bool,
    /// Key under which scroll position, selection and expanded state are persisted.
    pub view_data_key: Option<String>,
    /// Delay between `schedule_rebuild` and the rebuild running in `tick`.
    pub rebuild_delay_ms: u64,
    pub drag_threshold: f32,
}

impl Default for CollectionViewOptions {
    fn default() -> Self {
        Self {
            virtualization: VirtualizationOptions::default(),
            selection_type: SelectionType::default(),
            reorderable: false,
            view_data_key: None,
            rebuild_delay_ms: 0,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

impl CollectionViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_virtualization(mut self, virtualization: VirtualizationOptions) -> Self {
        self.virtualization = virtualization;
        self
    }

    pub fn with_method(mut self, method: VirtualizationMethod) -> Self {
        self.virtualization.method = method;
        self
    }

    pub fn with_item_height(mut self, item_height: u32) -> Self {
        self.virtualization.item_height = item_height;
        self
    }

    pub fn with_selection_type(mut self, selection_type: SelectionType) -> Self {
        self.selection_type = selection_type;
        self
    }

    pub fn with_reorderable(mut self, reorderable: bool) -> Self {
        self.reorderable = reorderable;
        self
    }

    pub fn with_view_data_key(mut self, key: impl Into<String>) -> Self {
        self.view_data_key = Some(key.into());
        self
    }

    pub fn with_rebuild_delay_ms(mut self, delay_ms: u64) -> Self {
        self.rebuild_delay_ms = delay_ms;
        self
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.virtualization.validate()
    }
}
