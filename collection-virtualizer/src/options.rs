use crate::{CollectionError, Result, VirtualizationMethod};

/// Row height used when nothing else is configured.
pub const DEFAULT_ITEM_HEIGHT: u32 = 22;

/// Rows kept beyond what the viewport strictly needs, so a one-row scroll never has to
/// construct an element before the old one has left.
pub const DEFAULT_EXTRA_VISIBLE_ITEMS: usize = 2;

/// Configuration for the virtualization controllers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualizationOptions {
    pub method: VirtualizationMethod,
    /// Row height in fixed-height mode; the estimate for unmeasured rows in dynamic mode.
    pub item_height: u32,
    pub extra_visible_items: usize,
    /// Quiet period after the last scroll event before `is_scrolling` turns off.
    pub scroll_direction_reset_delay_ms: u64,
}

impl Default for VirtualizationOptions {
    fn default() -> Self {
        Self {
            method: VirtualizationMethod::default(),
            item_height: DEFAULT_ITEM_HEIGHT,
            extra_visible_items: DEFAULT_EXTRA_VISIBLE_ITEMS,
            scroll_direction_reset_delay_ms: 150,
        }
    }
}

impl VirtualizationOptions {
    pub fn new(method: VirtualizationMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: VirtualizationMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the item height. A zero height is rejected by [`VirtualizationOptions::validate`].
    pub fn with_item_height(mut self, item_height: u32) -> Self {
        self.item_height = item_height;
        self
    }

    /// Sets the item height from a style value, rejecting negative, zero and non-finite input.
    pub fn try_with_item_height(mut self, item_height: f32) -> Result<Self> {
        self.item_height = item_height_from_style(item_height)?;
        Ok(self)
    }

    pub fn with_extra_visible_items(mut self, extra_visible_items: usize) -> Self {
        self.extra_visible_items = extra_visible_items;
        self
    }

    pub fn with_scroll_direction_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.scroll_direction_reset_delay_ms = delay_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.item_height == 0 {
            return Err(CollectionError::InvalidItemHeight(0.0));
        }
        Ok(())
    }
}

/// Converts a host style height into whole pixels.
pub fn item_height_from_style(height: f32) -> Result<u32> {
    if !height.is_finite() || height <= 0.0 {
        return Err(CollectionError::InvalidItemHeight(height));
    }
    Ok(round_height(height).max(1))
}

/// Rounds a finite, non-negative layout height to whole pixels.
pub(crate) fn round_height(height: f32) -> u32 {
    let rounded = (height + 0.5) as u64;
    rounded.min(u32::MAX as u64) as u32
}
