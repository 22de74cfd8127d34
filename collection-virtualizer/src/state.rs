/// Scroll state that survives view reconstruction.
///
/// `content_height`, `content_padding` and the anchor are only meaningful for dynamic-height
/// virtualization; fixed-height controllers derive everything from the offset.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualizationState {
    pub first_visible_index: usize,
    pub scroll_offset: u64,
    pub content_height: u64,
    pub content_padding: u64,
    pub anchored_item_index: Option<usize>,
    /// Distance from the anchored item's top edge to the scroll offset.
    pub anchor_offset: u64,
}
