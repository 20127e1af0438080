use term_dock::constants::{DEFAULT_HANDLE_SIZE, DOCK_PANEL_CLASS, DOCK_SPLIT_PANEL_CLASS};
use term_dock::{
    AFTER_ATTACH, CHILD_ADDED, DockError, DockMode, DockPanel, EventLog, LAYOUT_REQUEST,
    WidgetKind,
};

#[test]
fn construction_is_observable_from_the_first_message() {
    let log = EventLog::new();
    let panel = DockPanel::new_observed(&log);

    // The root split joins the panel, then the attach walks both nodes.
    assert_eq!(log.kinds(), vec![CHILD_ADDED, AFTER_ATTACH, AFTER_ATTACH]);

    assert!(panel.widgets().has_class(panel.id(), DOCK_PANEL_CLASS));
    let root = panel.root().unwrap();
    assert!(panel.widgets().has_class(root, DOCK_SPLIT_PANEL_CLASS));
    assert!(matches!(
        panel.widgets().kind(root),
        Some(WidgetKind::Split { .. })
    ));
    assert!(panel.widgets().children(root).is_empty());
}

#[test]
fn handle_size_reaches_every_split_and_coalesces_relayout() {
    let log = EventLog::new();
    let mut panel = DockPanel::new_observed(&log);
    assert_eq!(panel.handle_size(), DEFAULT_HANDLE_SIZE);
    panel.set_handle_size(5);

    let a = panel.create_content("a", false);
    let b = panel.create_content("b", false);
    let c = panel.create_content("c", false);
    panel.add_widget(a, None, None).unwrap();
    panel.add_widget(b, Some(DockMode::SplitRight), Some(a)).unwrap();
    panel.add_widget(c, Some(DockMode::SplitBottom), Some(b)).unwrap();

    // The wrapper split created while docking picked the size up too.
    let root = panel.root().unwrap();
    let wrapper = panel.widgets().children(root)[1];
    assert_eq!(panel.widgets().split_handle_size(root), Some(5));
    assert_eq!(panel.widgets().split_handle_size(wrapper), Some(5));

    panel.flush_posted();
    log.clear();
    panel.set_handle_size(7);
    panel.set_handle_size(7);
    assert_eq!(panel.handle_size(), 7);
    assert_eq!(panel.widgets().split_handle_size(root), Some(7));
    assert_eq!(panel.widgets().split_handle_size(wrapper), Some(7));

    // One conflated relayout request for both calls, delivered on flush.
    assert_eq!(log.count(LAYOUT_REQUEST), 0);
    panel.flush_posted();
    assert_eq!(log.count(LAYOUT_REQUEST), 1);
}

#[test]
fn tab_property_gates_docking() {
    let mut panel = DockPanel::new();
    let bare = panel.widgets_mut().create_widget();
    assert_eq!(panel.tab(bare), None);

    let err = panel.add_widget(bare, None, None).unwrap_err();
    assert_eq!(err, DockError::WidgetHasNoTab);
    assert_eq!(err.to_string(), "widget has no tab");
    assert_eq!(panel.widgets().parent(bare), None);

    let tab = panel.widgets_mut().create_tab("late", false);
    panel.set_tab(bare, tab);
    assert_eq!(panel.tab(bare), Some(tab));
    panel.add_widget(bare, None, None).unwrap();
    assert!(panel.widgets().parent(bare).is_some());
}

#[test]
fn reference_must_differ_from_the_widget() {
    let mut panel = DockPanel::new();
    let widget = panel.create_content("solo", false);
    let err = panel
        .add_widget(widget, Some(DockPanel::TAB_AFTER), Some(widget))
        .unwrap_err();
    assert_eq!(err, DockError::SelfReference);
    assert_eq!(err.to_string(), "widget and reference are identical");
    assert_eq!(panel.widgets().parent(widget), None);
}

#[test]
fn dead_reference_falls_back_to_root_relative() {
    let mut panel = DockPanel::new();
    let a = panel.create_content("a", false);
    let gone = panel.create_content("gone", false);
    panel.add_widget(a, None, None).unwrap();
    panel.add_widget(gone, None, None).unwrap();
    assert!(panel.remove_widget(gone));

    // `gone` is alive but undocked, so it cannot anchor a placement.
    let b = panel.create_content("b", false);
    panel.add_widget(b, Some(DockMode::SplitLeft), Some(gone)).unwrap();

    let root = panel.root().unwrap();
    let groups = panel.widgets().children(root);
    assert_eq!(groups.len(), 2);
    let stack_b = panel.widgets().parent(b).unwrap();
    assert_eq!(panel.widgets().parent(stack_b), Some(groups[0]));
    let stack_a = panel.widgets().parent(a).unwrap();
    assert_eq!(panel.widgets().parent(stack_a), Some(groups[1]));
}

#[test]
fn selection_follows_insertion_and_survives_removal() {
    let mut panel = DockPanel::new();
    let a = panel.create_content("a", false);
    let b = panel.create_content("b", false);
    let c = panel.create_content("c", false);
    panel.add_widget(a, None, None).unwrap();
    panel.add_widget(b, Some(DockMode::TabAfter), Some(a)).unwrap();
    panel.add_widget(c, Some(DockMode::TabAfter), Some(b)).unwrap();

    let stack = panel.widgets().parent(a).unwrap();
    let group = panel.widgets().parent(stack).unwrap();
    let bar = panel.widgets().children(group)[0];

    // The latest insertion owns the selection.
    assert_eq!(panel.widgets().tab_bar_selected(bar), Some(2));
    assert_eq!(panel.widgets().stack_current(stack), Some(c));

    assert!(panel.select(a));
    assert_eq!(panel.widgets().tab_bar_selected(bar), Some(0));
    assert_eq!(panel.widgets().stack_current(stack), Some(a));

    // Removing the selected tab hands the selection to its neighbor.
    assert!(panel.remove_widget(a));
    assert_eq!(panel.widgets().tab_bar_selected(bar), Some(0));
    assert_eq!(panel.widgets().stack_current(stack), Some(b));
    assert!(!panel.select(a));
}

#[test]
fn close_widget_disposes_remove_widget_does_not() {
    let mut panel = DockPanel::new();
    let a = panel.create_content("a", false);
    let b = panel.create_content("b", false);
    panel.add_widget(a, None, None).unwrap();
    panel.add_widget(b, Some(DockMode::TabAfter), Some(a)).unwrap();

    assert!(panel.remove_widget(a));
    assert!(!panel.widgets().is_disposed(a));
    assert_eq!(panel.widgets().parent(a), None);

    assert!(panel.close_widget(b));
    assert!(panel.widgets().is_disposed(b));

    // Nothing docked remains; the root split is empty again.
    assert!(panel.widgets().children(panel.root().unwrap()).is_empty());
    assert!(!panel.remove_widget(a));
}

#[test]
fn layout_requests_conflate_until_flushed() {
    let log = EventLog::new();
    let mut panel = DockPanel::new_observed(&log);
    let a = panel.create_content("a", false);
    let b = panel.create_content("b", false);
    panel.add_widget(a, None, None).unwrap();
    panel.add_widget(b, None, None).unwrap();

    assert!(panel.widgets().has_posted(panel.id(), LAYOUT_REQUEST));
    assert_eq!(log.count(LAYOUT_REQUEST), 0);

    panel.flush_posted();
    assert_eq!(log.count(LAYOUT_REQUEST), 1);
    assert!(!panel.widgets().has_posted(panel.id(), LAYOUT_REQUEST));
}
