use crate::*;

use alloc::vec::Vec;
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

#[derive(Debug, Default)]
struct Row {
    visible: bool,
    fixed_height: Option<u32>,
    bound: Option<usize>,
    ghost: bool,
    attached: bool,
}

impl ItemElement for Row {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_fixed_height(&mut self, height: Option<u32>) {
        self.fixed_height = height;
    }

    fn set_drag_ghost(&mut self, ghost: bool) {
        self.ghost = ghost;
    }

    fn pre_attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}

#[derive(Debug, Default)]
struct Source {
    ids: Vec<ItemId>,
    made: usize,
    binds: usize,
    unbinds: usize,
    destroyed: usize,
}

impl Source {
    fn new(count: usize) -> Self {
        Self {
            ids: (0..count as u64).collect(),
            ..Self::default()
        }
    }
}

impl ItemBinder<Row> for Source {
    fn item_count(&self) -> usize {
        self.ids.len()
    }

    fn item_id(&self, index: usize) -> ItemId {
        self.ids[index]
    }

    fn make_item(&mut self) -> Row {
        self.made += 1;
        Row::default()
    }

    fn bind_item(&mut self, element: &mut Row, index: usize) {
        assert!(element.bound.is_none(), "row bound twice without unbind");
        element.bound = Some(index);
        self.binds += 1;
    }

    fn unbind_item(&mut self, element: &mut Row, index: usize) {
        assert_eq!(element.bound, Some(index));
        element.bound = None;
        self.unbinds += 1;
    }

    fn destroy_item(&mut self, element: Row) {
        assert!(element.bound.is_none());
        self.destroyed += 1;
    }
}

fn fixed(item_height: u32) -> FixedHeightController<Row> {
    FixedHeightController::new(&VirtualizationOptions::default().with_item_height(item_height))
}

fn dynamic(item_height: u32) -> DynamicHeightController<Row> {
    DynamicHeightController::new(
        &VirtualizationOptions::new(VirtualizationMethod::DynamicHeight)
            .with_item_height(item_height),
    )
}

fn bound_indices(c: &dyn VirtualizationController<Row>) -> Vec<usize> {
    c.active_items().iter().filter_map(|r| r.index()).collect()
}

fn assert_unique_bindings(c: &dyn VirtualizationController<Row>) {
    let mut seen = bound_indices(c);
    let len = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), len, "two rows bound to the same index");
    for item in c.active_items() {
        assert_eq!(item.element().bound, item.index());
        assert_eq!(item.element().visible, item.is_bound());
    }
}

fn measure(
    c: &mut dyn VirtualizationController<Row>,
    src: &mut Source,
    index: usize,
    height: f32,
    now_ms: u64,
) {
    c.on_geometry_changed(index, ResolvedRect::new(0.0, 0.0, 100.0, height), now_ms, src);
}

#[test]
fn fixed_window_does_not_grow_with_item_count() {
    for count in [100usize, 10_000, 1_000_000] {
        let mut src = Source::new(count);
        let mut c = fixed(20);
        c.resize(200, &mut src);
        assert_eq!(c.created_items(), 12, "count={count}");
        assert_eq!(c.active_items().len(), 12);
    }

    let mut src = Source::new(5);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    assert_eq!(c.created_items(), 5);
    assert_eq!(bound_indices(&c), [0, 1, 2, 3, 4]);
}

#[test]
fn fixed_scroll_to_middle_of_large_list() {
    let mut src = Source::new(100_000);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    c.on_scroll(50_000 * 20, 0, &mut src);

    assert_eq!(c.first_visible_index(), 50_000);
    assert_eq!(c.active_items().len(), 10 + 2);
    assert_eq!(c.created_items(), 12);
    assert_eq!(c.content_padding(), 50_000 * 20);
    assert_eq!(c.expected_content_height(), 100_000 * 20);
    assert_eq!(bound_indices(&c), (50_000..50_012).collect::<Vec<_>>());
    assert_eq!(
        c.visible_range(),
        VisibleRange {
            start_index: 50_000,
            end_index: 50_010
        }
    );
    assert_unique_bindings(&c);
}

#[test]
fn fixed_rows_carry_the_pinned_height() {
    let mut src = Source::new(30);
    let mut c = fixed(24);
    c.resize(100, &mut src);
    assert!(
        c.active_items()
            .iter()
            .all(|r| r.element().fixed_height == Some(24))
    );
}

#[test]
fn fixed_one_row_scroll_rebinds_one_row() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    let created = c.created_items();
    let binds = src.binds;

    c.on_scroll(20, 0, &mut src);
    assert_eq!(c.first_visible_index(), 1);
    assert_eq!(c.created_items(), created);
    assert_eq!(src.binds, binds + 1);
    assert_eq!(src.unbinds, 1);
    assert_eq!(bound_indices(&c), (1..13).collect::<Vec<_>>());

    // Scrolling back rotates the same row to the front again.
    c.on_scroll(0, 1, &mut src);
    assert_eq!(bound_indices(&c), (0..12).collect::<Vec<_>>());
    assert_eq!(src.binds, binds + 2);
}

#[test]
fn fixed_offset_is_clamped_to_content() {
    let mut src = Source::new(20);
    let mut c = fixed(10);
    c.resize(50, &mut src);
    c.on_scroll(10_000, 0, &mut src);
    assert_eq!(c.scroll_offset(), 150);
    assert_eq!(c.first_visible_index(), 15);
    assert_eq!(c.visible_range().end_index, 20);
    assert_unique_bindings(&c);
}

#[test]
fn fixed_scroll_to_item_brings_item_into_view() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(200, &mut src);

    c.scroll_to_item(ScrollTarget::Index(500), 0, &mut src);
    assert_eq!(c.scroll_offset(), 501 * 20 - 200);
    assert!(c.visible_range().contains(500));

    // Already fully visible: no movement.
    let offset = c.scroll_offset();
    c.scroll_to_item(ScrollTarget::Index(495), 0, &mut src);
    assert_eq!(c.scroll_offset(), offset);

    c.scroll_to_item(ScrollTarget::Index(10), 0, &mut src);
    assert_eq!(c.scroll_offset(), 200);
    assert_eq!(c.first_visible_index(), 10);

    c.scroll_to_item(ScrollTarget::End, 0, &mut src);
    assert_eq!(c.scroll_offset(), c.max_scroll_offset());
    assert_eq!(c.visible_range().end_index, 1000);

    // Programmatic scrolling is not user scrolling.
    assert!(!c.is_scrolling());
}

#[test]
fn fixed_scroll_to_item_respects_partial_offset() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(110, &mut src);
    c.on_scroll(115, 0, &mut src);

    // Item 10 spans 200..220, inside 115..225.
    c.scroll_to_item(ScrollTarget::Index(10), 0, &mut src);
    assert_eq!(c.scroll_offset(), 115);

    c.scroll_to_item(ScrollTarget::Index(11), 0, &mut src);
    assert_eq!(c.scroll_offset(), 240 - 110);

    // Item 6 is cut off at the top.
    c.scroll_to_item(ScrollTarget::Index(6), 0, &mut src);
    assert_eq!(c.scroll_offset(), 120);
    assert_unique_bindings(&c);
}

#[test]
fn scroll_direction_resets_after_quiet_period() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(200, &mut src);

    c.on_scroll(100, 0, &mut src);
    assert!(c.is_scrolling());
    assert_eq!(c.scroll_direction(), Some(ScrollDirection::Forward));

    c.tick(100, &mut src);
    assert!(c.is_scrolling());
    c.on_scroll(60, 120, &mut src);
    assert_eq!(c.scroll_direction(), Some(ScrollDirection::Backward));

    // The second scroll pushed the reset back.
    c.tick(200, &mut src);
    assert!(c.is_scrolling());
    c.tick(270, &mut src);
    assert!(!c.is_scrolling());
    assert_eq!(c.scroll_direction(), None);
}

#[test]
fn shrinking_viewport_pools_rows_for_reuse() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    assert_eq!(c.created_items(), 12);

    c.resize(100, &mut src);
    assert_eq!(c.active_items().len(), 7);
    assert_eq!(c.created_items(), 12);
    assert!(c.active_items().iter().all(|r| r.element().attached));

    c.resize(200, &mut src);
    assert_eq!(c.active_items().len(), 12);
    assert_eq!(c.created_items(), 12);
    assert_eq!(src.made, 12);
    assert_unique_bindings(&c);
}

#[test]
fn rebuild_destroys_and_recreates_rows() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    c.refresh(true, &mut src);
    assert_eq!(src.destroyed, 12);
    assert_eq!(src.made, 24);
    assert_eq!(c.created_items(), 12);

    // Plain refresh rebinds in place.
    let binds = src.binds;
    c.refresh(false, &mut src);
    assert_eq!(src.made, 24);
    assert_eq!(src.binds, binds + 12);

    c.destroy(&mut src);
    assert_eq!(c.created_items(), 0);
    assert_eq!(src.destroyed, 24);
}

#[test]
fn fixed_item_height_change_keeps_first_row() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    c.on_scroll(400, 0, &mut src);
    assert_eq!(c.first_visible_index(), 20);

    c.set_item_height(40, &mut src);
    assert_eq!(c.first_visible_index(), 20);
    assert_eq!(c.scroll_offset(), 800);
    assert_eq!(c.active_items().len(), 5 + 2);
    assert!(
        c.active_items()
            .iter()
            .all(|r| r.element().fixed_height == Some(40))
    );
}

#[test]
fn fixed_shrinking_source_hides_rows() {
    let mut src = Source::new(100);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    src.ids.truncate(3);
    c.on_items_source_size_changed(&mut src);
    assert_eq!(bound_indices(&c), [0, 1, 2]);
    assert_eq!(c.expected_content_height(), 60);
    assert_unique_bindings(&c);
}

#[test]
fn fixed_drag_marks_ghost_row() {
    let mut src = Source::new(100);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    c.start_drag(3, &mut src);
    assert_eq!(c.dragged_index(), Some(3));
    let ghosts: Vec<_> = c
        .active_items()
        .iter()
        .filter(|r| r.is_drag_ghost())
        .filter_map(|r| r.index())
        .collect();
    assert_eq!(ghosts, [3]);

    c.end_drag(0, &mut src);
    assert_eq!(c.dragged_index(), None);
    assert!(c.active_items().iter().all(|r| !r.element().ghost));
}

#[test]
fn fixed_restore_state_round_trips_offset() {
    let mut src = Source::new(1000);
    let mut c = fixed(20);
    c.resize(200, &mut src);
    c.on_scroll(1234, 0, &mut src);
    let state = c.state();

    let mut restored = fixed(20);
    restored.resize(200, &mut src);
    restored.restore_state(state, &mut src);
    assert_eq!(restored.scroll_offset(), 1234);
    assert_eq!(restored.first_visible_index(), 61);
}

#[test]
fn dynamic_heights_replace_estimates() {
    let natural = [20.0f32, 40.0, 20.0];
    let mut src = Source::new(3);
    let mut c = dynamic(DEFAULT_ITEM_HEIGHT);
    c.resize(200, &mut src);
    assert_eq!(bound_indices(&c), [0, 1, 2]);
    assert_eq!(c.expected_content_height(), 3 * DEFAULT_ITEM_HEIGHT as u64);
    assert_eq!(c.waiting_for_layout().count(), 3);
    assert!(c.active_items().iter().all(|r| r.element().fixed_height.is_none()));

    for (index, &h) in natural.iter().enumerate() {
        measure(&mut c, &mut src, index, h, 0);
    }
    assert_eq!(c.expected_content_height(), 80);
    assert_eq!(c.content_height_for_index(1), 60);
    assert_eq!(c.waiting_for_layout().count(), 0);
    assert!(c.is_fill_scheduled());

    c.tick(0, &mut src);
    assert!(!c.is_fill_scheduled());
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_ignores_unresolved_geometry() {
    let mut src = Source::new(3);
    let mut c = dynamic(20);
    c.resize(200, &mut src);
    measure(&mut c, &mut src, 0, f32::NAN, 0);
    measure(&mut c, &mut src, 1, 0.0, 0);
    measure(&mut c, &mut src, 2, -4.0, 0);
    assert_eq!(c.expected_content_height(), 60);
    assert_eq!(c.heights().measured_count(), 0);
    assert!(!c.is_fill_scheduled());
}

#[test]
fn dynamic_rounds_fractional_heights() {
    let mut src = Source::new(2);
    let mut c = dynamic(20);
    c.resize(200, &mut src);
    measure(&mut c, &mut src, 0, 30.6, 0);
    assert_eq!(c.heights().height(0), Some(31));
}

#[test]
fn dynamic_window_does_not_grow_with_item_count() {
    let mut created = Vec::new();
    for count in [50usize, 5_000, 500_000] {
        let mut src = Source::new(count);
        let mut c = dynamic(22);
        c.resize(200, &mut src);
        created.push(c.created_items());
        assert!(c.created_items() <= 200usize.div_ceil(22) + DEFAULT_EXTRA_VISIBLE_ITEMS);
    }
    assert!(created.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn dynamic_window_grows_to_cover_short_rows() {
    let mut src = Source::new(100);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    assert_eq!(bound_indices(&c), [0, 1, 2, 3, 4]);

    for i in 0..5 {
        measure(&mut c, &mut src, i, 10.0, 0);
    }
    c.tick(0, &mut src);
    // Five measured rows cover 50px; unmeasured rows still count 20px each.
    assert_eq!(bound_indices(&c), (0..8).collect::<Vec<_>>());
    assert_eq!(c.heights().min_item_height(), 10);
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_scroll_uses_measured_offsets() {
    let mut src = Source::new(100);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    measure(&mut c, &mut src, 0, 100.0, 0);
    c.tick(0, &mut src);

    c.on_scroll(110, 1, &mut src);
    assert_eq!(c.first_visible_index(), 1);
    assert_eq!(c.content_padding(), 100);
    assert_eq!(c.index_from_position(99), 0);
    assert_eq!(c.index_from_position(100), 1);
    assert_eq!(c.index_from_position(125), 2);
    assert_eq!(c.state().anchored_item_index, Some(1));
    assert_eq!(c.state().anchor_offset, 10);
}

#[test]
fn dynamic_sticks_to_bottom_when_pinned() {
    let mut src = Source::new(50);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    c.scroll_to_item(ScrollTarget::End, 0, &mut src);
    assert_eq!(c.scroll_offset(), 900);
    assert_eq!(c.first_visible_index(), 45);

    measure(&mut c, &mut src, 49, 40.0, 0);
    assert_eq!(c.expected_content_height(), 1020);
    assert_eq!(c.scroll_offset(), 920);

    measure(&mut c, &mut src, 48, 10.0, 0);
    assert_eq!(c.scroll_offset(), 910);
    c.tick(0, &mut src);
    assert_eq!(c.scroll_offset(), c.max_scroll_offset());
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_unpinned_offset_survives_measurement_below() {
    let mut src = Source::new(50);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    c.on_scroll(210, 0, &mut src);
    measure(&mut c, &mut src, 12, 60.0, 0);
    assert_eq!(c.scroll_offset(), 210);
    assert_eq!(c.first_visible_index(), 10);
}

#[test]
fn dynamic_anchor_follows_insertions_above() {
    let mut src = Source::new(50);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    c.on_scroll(210, 0, &mut src);
    assert_eq!(c.state().anchored_item_index, Some(10));

    src.ids = (100..105).chain(0..50).collect();
    c.on_items_inserted(0, 5);
    c.on_items_source_size_changed(&mut src);
    assert_eq!(c.scroll_offset(), 310);
    assert_eq!(c.first_visible_index(), 15);
    assert_eq!(c.active_items()[0].id(), Some(10));
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_removal_rekeys_measurements() {
    let mut src = Source::new(3);
    let mut c = dynamic(22);
    c.resize(200, &mut src);
    measure(&mut c, &mut src, 0, 20.0, 0);
    measure(&mut c, &mut src, 1, 40.0, 0);
    measure(&mut c, &mut src, 2, 30.0, 0);

    src.ids.remove(1);
    c.on_items_removed(&[1]);
    c.on_items_source_size_changed(&mut src);
    assert_eq!(c.expected_content_height(), 50);
    assert_eq!(c.heights().height(1), Some(30));
    assert_unique_bindings(&c);

    src.ids.swap(0, 1);
    c.on_item_moved(0, 1);
    assert_eq!(c.heights().height(0), Some(30));
    assert_eq!(c.heights().height(1), Some(20));
}

#[test]
fn dynamic_drag_excludes_row_from_content() {
    let mut src = Source::new(3);
    let mut c = dynamic(22);
    c.resize(200, &mut src);
    measure(&mut c, &mut src, 0, 20.0, 0);
    measure(&mut c, &mut src, 1, 40.0, 0);
    measure(&mut c, &mut src, 2, 20.0, 0);

    c.start_drag(1, &mut src);
    assert_eq!(c.expected_content_height(), 40);
    assert_eq!(c.content_height_for_index(1), 20);
    let ghost = c.active_items().iter().find(|r| r.is_drag_ghost());
    assert_eq!(ghost.and_then(|r| r.index()), Some(1));

    // Geometry of the dragged row does not feed the cache.
    measure(&mut c, &mut src, 1, 99.0, 0);
    assert_eq!(c.heights().height(1), Some(40));

    c.end_drag(5, &mut src);
    assert_eq!(c.expected_content_height(), 80);
    assert!(c.active_items().iter().all(|r| !r.is_drag_ghost()));
    assert!(c.is_fill_scheduled());
    c.tick(5, &mut src);
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_scroll_to_item_retargets_after_measurement() {
    let mut src = Source::new(100);
    let mut c = dynamic(20);
    c.resize(100, &mut src);

    c.scroll_to_item(ScrollTarget::Index(50), 0, &mut src);
    assert_eq!(c.scroll_offset(), 51 * 20 - 100);
    assert!(c.visible_range().contains(50));
    // Only the rows bound at the new position wait for layout.
    assert_eq!(
        c.waiting_for_layout().collect::<Vec<_>>(),
        (46..51).collect::<Vec<_>>()
    );

    // Rows above the target come out taller than estimated, pushing it below the viewport.
    for index in 46..51 {
        measure(&mut c, &mut src, index, 30.0, 1);
    }
    assert_eq!(c.waiting_for_layout().count(), 0);
    assert_eq!(c.scroll_offset(), 920);

    c.tick(1, &mut src);
    assert_eq!(c.scroll_offset(), 46 * 20 + 5 * 30 - 100);
    assert_eq!(c.first_visible_index(), 47);
    assert!(c.visible_range().contains(50));
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_far_scroll_to_item_retargets_after_measurement() {
    let mut src = Source::new(1000);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    assert_eq!(c.waiting_for_layout().count(), 5);

    c.scroll_to_item(ScrollTarget::Index(800), 0, &mut src);
    assert_eq!(c.scroll_offset(), 801 * 20 - 100);
    assert_eq!(
        c.waiting_for_layout().collect::<Vec<_>>(),
        (796..801).collect::<Vec<_>>()
    );

    let bound = bound_indices(&c);
    for index in bound {
        measure(&mut c, &mut src, index, 60.0, 3);
    }
    assert_eq!(c.waiting_for_layout().count(), 0);
    for now in 3..13 {
        c.tick(now, &mut src);
    }

    // Item 800 now starts at 796 * 20 + 4 * 60 and ends at the bottom edge.
    assert_eq!(c.scroll_offset(), 796 * 20 + 5 * 60 - 100);
    assert!(c.visible_range().contains(800));
    assert_eq!(c.waiting_for_layout().count(), 0);
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_waiting_set_only_tracks_bound_rows() {
    let mut src = Source::new(10_000);
    let mut c = dynamic(20);
    c.resize(100, &mut src);

    for step in 0..2_000u64 {
        c.on_scroll(step * 50, step, &mut src);
        let bound = bound_indices(&c);
        let waiting: Vec<_> = c.waiting_for_layout().collect();
        assert!(waiting.len() <= c.active_items().len());
        assert!(waiting.iter().all(|i| bound.contains(i)));
    }
    assert_eq!(c.waiting_for_layout().count(), bound_indices(&c).len());
    assert!(c.active_items().len() <= 100usize.div_ceil(20) + DEFAULT_EXTRA_VISIBLE_ITEMS);

    // Hidden rows stop waiting too.
    src.ids.truncate(2);
    c.on_items_source_size_changed(&mut src);
    assert_eq!(c.waiting_for_layout().collect::<Vec<_>>(), [0, 1]);
}

#[test]
fn dynamic_shrinking_source_purges_cache_and_min_height() {
    let mut src = Source::new(100);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    c.on_scroll(1800, 0, &mut src);
    assert_eq!(bound_indices(&c), (90..95).collect::<Vec<_>>());

    for index in 90..95 {
        measure(&mut c, &mut src, index, 5.0, 0);
    }
    c.tick(0, &mut src);
    assert_eq!(c.heights().min_item_height(), 5);
    // 5 short rows plus 4 unmeasured ones cover the viewport.
    assert_eq!(c.active_items().len(), 9);

    src.ids.truncate(50);
    c.on_items_source_size_changed(&mut src);
    assert_eq!(c.heights().len(), 50);
    assert_eq!(c.heights().measured_count(), 0);
    assert_eq!(c.heights().min_item_height(), 20);
    assert_eq!(c.scroll_offset(), 900);
    assert_eq!(bound_indices(&c), (45..50).collect::<Vec<_>>());

    c.resize(100, &mut src);
    assert_eq!(
        c.active_items().len(),
        100usize.div_ceil(20) + DEFAULT_EXTRA_VISIBLE_ITEMS
    );
    assert_unique_bindings(&c);
}

#[test]
fn dynamic_restore_state_uses_anchor() {
    let mut src = Source::new(100);
    let mut c = dynamic(20);
    c.resize(100, &mut src);
    c.on_scroll(430, 0, &mut src);
    let state = c.state();
    assert_eq!(state.anchored_item_index, Some(21));
    assert_eq!(state.anchor_offset, 10);

    let mut restored = dynamic(20);
    restored.resize(100, &mut src);
    restored.restore_state(state, &mut src);
    assert_eq!(restored.scroll_offset(), 430);
    assert_eq!(restored.first_visible_index(), 21);
}

#[test]
fn create_controller_matches_method() {
    let c = create_controller::<Row>(&VirtualizationOptions::default());
    assert_eq!(c.method(), VirtualizationMethod::FixedHeight);
    let c = create_controller::<Row>(&VirtualizationOptions::new(
        VirtualizationMethod::DynamicHeight,
    ));
    assert_eq!(c.method(), VirtualizationMethod::DynamicHeight);
}

#[test]
fn item_height_validation() {
    assert_eq!(item_height_from_style(21.6), Ok(22));
    assert_eq!(item_height_from_style(0.2), Ok(1));
    assert!(matches!(
        item_height_from_style(0.0),
        Err(CollectionError::InvalidItemHeight(_))
    ));
    assert!(item_height_from_style(-3.0).is_err());
    assert!(item_height_from_style(f32::NAN).is_err());
    assert!(item_height_from_style(f32::INFINITY).is_err());

    assert!(
        VirtualizationOptions::default()
            .with_item_height(0)
            .validate()
            .is_err()
    );
    let opts = VirtualizationOptions::default()
        .try_with_item_height(30.0)
        .unwrap();
    assert_eq!(opts.item_height, 30);
}

#[test]
fn debounced_task_coalesces() {
    let mut task = DebouncedTask::new(50);
    assert!(!task.poll(0));
    task.schedule(0);
    task.schedule(30);
    assert_eq!(task.due_ms(), Some(80));
    assert!(!task.poll(79));
    assert!(task.poll(80));
    assert!(!task.poll(200));

    task.schedule(200);
    assert!(task.cancel());
    assert!(!task.cancel());
    assert!(!task.poll(1000));
}

#[test]
fn selection_tracks_ids() {
    let mut sel = Selection::new();
    assert!(sel.add(2, 42));
    assert!(!sel.add(5, 42));
    assert!(sel.add(4, 7));
    assert_eq!(sel.ids(), [42, 7]);
    assert_eq!(sel.last_index(), Some(4));

    // Item 42 moved to index 3, item 7 disappeared.
    let changed = sel.refresh(|id| (id == 42).then_some(3));
    assert!(changed);
    assert_eq!(sel.ids(), [42]);
    assert_eq!(sel.indices(), [3]);
    assert!(!sel.contains_id(7));

    assert!(!sel.set([(3, 42)]));
    assert!(sel.set([(0, 1), (1, 2)]));
    assert!(sel.remove_index(0));
    assert_eq!(sel.ids(), [2]);
    assert!(sel.clear());
    assert!(sel.is_empty());
}

#[test]
fn height_cache_exclusion_and_reset() {
    let mut cache = HeightCache::new(4, 10);
    cache.register(1, 30);
    cache.set_excluded(Some(1));
    assert_eq!(cache.total(), 30);
    assert_eq!(cache.start_of(2), 10);
    assert_eq!(cache.index_at_offset(10), 2);

    cache.insert(0, 2);
    assert_eq!(cache.excluded(), Some(3));
    assert_eq!(cache.total(), 50);

    cache.set_excluded(None);
    assert_eq!(cache.total(), 80);

    cache.reset();
    assert_eq!(cache.measured_count(), 0);
    assert_eq!(cache.total(), 60);
}

#[test]
fn random_scrolls_keep_bindings_unique() {
    let mut rng = Lcg::new(7);
    let mut src = Source::new(10_000);
    let mut fixed_c = fixed(18);
    let mut dynamic_c = dynamic(18);
    fixed_c.resize(300, &mut src);
    dynamic_c.resize(300, &mut src);

    for step in 0..500u64 {
        let offset = rng.gen_range_u64(0, 200_000);
        fixed_c.on_scroll(offset, step, &mut src);
        dynamic_c.on_scroll(offset, step, &mut src);
        let rows: Vec<_> = dynamic_c.waiting_for_layout().collect();
        for index in rows {
            let h = rng.gen_range_u32(5, 60) as f32;
            measure(&mut dynamic_c, &mut src, index, h, step);
        }
        dynamic_c.tick(step, &mut src);
        assert_unique_bindings(&fixed_c);
        assert_unique_bindings(&dynamic_c);
        assert!(fixed_c.created_items() <= 300usize.div_ceil(18) + 2);
    }
}

proptest! {
    #[test]
    fn content_height_matches_exact_sum(
        count in 1usize..200,
        default_height in 1u32..64,
        registrations in prop::collection::vec((0usize..200, 1u32..200), 0..100),
    ) {
        let mut cache = HeightCache::new(count, default_height);
        let mut expected = alloc::vec![default_height; count];
        for (index, height) in registrations {
            if index < count {
                cache.register(index, height);
                expected[index] = height;
            }
        }
        let mut sum = 0u64;
        for (k, &h) in expected.iter().enumerate() {
            sum += h as u64;
            prop_assert_eq!(cache.content_height_for_index(k), sum);
        }
        prop_assert_eq!(cache.total(), sum);
    }

    #[test]
    fn fixed_index_from_position_is_monotonic(
        item_height in 1u32..100,
        a in 0u64..1_000_000,
        b in 0u64..1_000_000,
    ) {
        let c = fixed(item_height);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(c.index_from_position(lo) <= c.index_from_position(hi));
    }

    #[test]
    fn fixed_scroll_to_item_makes_it_visible(
        count in 1usize..5000,
        item_height in 1u32..50,
        viewport in 1u32..500,
        start in 0u64..100_000,
        target in 0usize..5000,
    ) {
        let target = target % count;
        let mut src = Source::new(count);
        let mut c = fixed(item_height);
        c.resize(viewport, &mut src);
        c.on_scroll(start, 0, &mut src);
        c.scroll_to_item(ScrollTarget::Index(target), 0, &mut src);
        prop_assert!(
            c.visible_range().contains(target),
            "range {:?} misses {}",
            c.visible_range(),
            target
        );
        prop_assert!(bound_indices(&c).contains(&target));
    }
}
