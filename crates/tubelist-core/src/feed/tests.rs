use super::*;
use crate::dom::{FeedBuilder, FixtureItem};

fn feed() -> (Document, Vec<NodeId>) {
    let doc = FeedBuilder::new()
        .item(FixtureItem::video("aaaaaaaaaaa", "First", "Chan A"))
        .item(FixtureItem::video("bbbbbbbbbbb", "Second", "Chan B"))
        .shelf_item(FixtureItem::shorts("sssssssssss", "Shelf short"))
        .item(FixtureItem::shorts("ccccccccccc", "Short"))
        .build();
    let items = scan_items(&doc);
    (doc, items)
}

/// Tag, classes, attributes and text of every attached node, indented by depth.
fn dump(doc: &Document) -> String {
    fn walk(doc: &Document, node: NodeId, depth: usize, out: &mut String) {
        let attrs: Vec<String> = [markers::PROCESSED, markers::KIND, "href", "id", "alt"]
            .iter()
            .filter_map(|a| doc.attr(node, a).map(|v| format!("{a}={v}")))
            .collect();
        out.push_str(&format!(
            "{}{} {:?} {:?} {:?}\n",
            "  ".repeat(depth),
            doc.tag(node),
            doc.classes(node),
            attrs,
            doc.text(node)
        ));
        for &child in doc.children(node) {
            walk(doc, child, depth + 1, out);
        }
    }
    let mut out = String::new();
    walk(doc, doc.root(), 0, &mut out);
    out
}

fn count(doc: &Document, item: NodeId, class: &str) -> usize {
    doc.select_all(item, &Selector::class(class)).len()
}

#[test]
fn collects_items_outside_shelves() {
    let (doc, items) = feed();
    assert_eq!(items.len(), 3);
    let again = collect_items(&doc, &[items[1], items[1], doc.root()]);
    assert_eq!(again[0], items[1]);
    assert_eq!(again.len(), 3);
}

#[test]
fn augments_video_item() {
    let (mut doc, items) = feed();
    let mut rec = Reconciler::new(true);
    let out = rec.reconcile(&mut doc, items[0], |_| None);
    let Outcome::Augmented { video_id, description } = out else {
        panic!("expected augmentation, got {out:?}");
    };
    assert_eq!(video_id.as_str(), "aaaaaaaaaaa");
    assert_eq!(description, DescriptionSlot::Loading);

    let item = items[0];
    assert_eq!(doc.attr(item, markers::PROCESSED), Some("aaaaaaaaaaa"));
    let header = doc.children(item)[0];
    assert!(doc.has_class(header, markers::HEADER_CLASS));
    let avatar_link = doc.select(header, &Selector::class(markers::AVATAR_LINK_CLASS)).unwrap();
    assert_eq!(doc.attr(avatar_link, "href"), Some("/@ChanA"));
    assert!(doc
        .select(avatar_link, &Selector::class("yt-lockup-metadata-view-model__avatar"))
        .is_some());
    let row = doc.select(header, &Selector::class(markers::META_ROW_CLASS)).unwrap();
    assert_eq!(doc.text_content(row), "Chan A 1.2K views 3 days ago");

    let placeholder = doc.select(item, &Selector::class(markers::DESCRIPTION_CLASS)).unwrap();
    assert!(doc.has_class(placeholder, markers::SKELETON_CLASS));
    let block = doc
        .select(item, &Selector::class("yt-lockup-metadata-view-model__metadata"))
        .unwrap();
    assert_eq!(doc.next_sibling(block), Some(placeholder));
    assert_eq!(loading_placeholders(&doc), vec![(placeholder, "aaaaaaaaaaa".to_string())]);
}

#[test]
fn reconcile_is_idempotent() {
    let (mut doc, items) = feed();
    let mut rec = Reconciler::new(true);
    rec.reconcile(&mut doc, items[0], |_| Some("Cached.".to_string()));
    let before = dump(&doc);
    assert_eq!(
        rec.reconcile(&mut doc, items[0], |_| panic!("lookup must not run")),
        Outcome::AlreadyProcessed
    );
    assert_eq!(dump(&doc), before);
    assert_eq!(count(&doc, items[0], markers::HEADER_CLASS), 1);
    assert_eq!(count(&doc, items[0], markers::DESCRIPTION_CLASS), 1);
}

#[test]
fn identity_change_resets_before_reprocessing() {
    let (mut doc, items) = feed();
    let item = items[0];
    let mut rec = Reconciler::new(true);
    rec.reconcile(&mut doc, item, |_| Some("Old description.".to_string()));

    // The host recycles the node for another video.
    for link in doc.select_all(item, &Selector::tag("a").with_attr_containing("href", "/watch?v=")) {
        doc.set_attr(link, "href", "/watch?v=zzzzzzzzzzz");
    }
    let out = rec.reconcile(&mut doc, item, |id| {
        assert_eq!(id.as_str(), "zzzzzzzzzzz");
        None
    });
    assert!(matches!(out, Outcome::Augmented { ref video_id, .. } if video_id.as_str() == "zzzzzzzzzzz"));
    assert_eq!(count(&doc, item, markers::HEADER_CLASS), 1);
    assert_eq!(count(&doc, item, markers::AVATAR_LINK_CLASS), 1);
    let placeholders = doc.select_all(item, &Selector::class(markers::DESCRIPTION_CLASS));
    assert_eq!(placeholders.len(), 1);
    assert_eq!(doc.attr(placeholders[0], markers::VIDEO_ID), Some("zzzzzzzzzzz"));
    assert_eq!(doc.text(placeholders[0]), "");
    assert_eq!(rec.moves().len(), 2);
}

#[test]
fn teardown_restores_original_structure() {
    let (mut doc, items) = feed();
    let original = dump(&doc);
    let mut rec = Reconciler::new(true);
    for &item in &items {
        rec.reconcile(&mut doc, item, |_| None);
    }
    assert_ne!(dump(&doc), original);

    assert_eq!(rec.teardown(&mut doc), 3);
    assert_eq!(dump(&doc), original);
    assert!(doc.select(doc.root(), &Selector::attr(markers::SYNTHETIC)).is_none());
    assert!(rec.moves().is_empty());
    assert_eq!(rec.touched().count(), 0);
}

#[test]
fn shorts_and_unrecognized_are_only_marked() {
    let mut doc = FeedBuilder::new()
        .item(FixtureItem::shorts("ccccccccccc", "Short"))
        .item(FixtureItem {
            kind: crate::dom::FixtureKind::Other,
            title: "Promo".into(),
            ..FixtureItem::default()
        })
        .build();
    let items = scan_items(&doc);
    let mut rec = Reconciler::new(true);
    assert_eq!(rec.reconcile(&mut doc, items[0], |_| None), Outcome::Ignored(ItemKind::Shorts));
    assert_eq!(doc.attr(items[0], markers::KIND), Some("shorts"));
    assert_eq!(
        rec.reconcile(&mut doc, items[1], |_| None),
        Outcome::Ignored(ItemKind::Unrecognized)
    );
    assert_eq!(rec.reconcile(&mut doc, items[1], |_| None), Outcome::AlreadyProcessed);
    assert_eq!(count(&doc, doc.root(), markers::HEADER_CLASS), 0);
}

#[test]
fn missing_metadata_is_skipped_without_markers() {
    let (mut doc, items) = feed();
    let model = doc
        .select(items[0], &Selector::tag("yt-content-metadata-view-model"))
        .unwrap();
    doc.detach(model);
    let mut rec = Reconciler::new(true);
    assert_eq!(
        rec.reconcile(&mut doc, items[0], |_| None),
        Outcome::Skipped(SkipReason::NoMetadata)
    );
    assert!(doc.attr(items[0], markers::PROCESSED).is_none());
}

#[test]
fn avatarless_variant_still_gets_header() {
    let mut doc = FeedBuilder::new()
        .item(FixtureItem {
            no_avatar: true,
            ..FixtureItem::video("aaaaaaaaaaa", "First", "Chan A")
        })
        .build();
    let item = scan_items(&doc)[0];
    let mut rec = Reconciler::new(false);
    let out = rec.reconcile(&mut doc, item, |_| None);
    assert!(matches!(out, Outcome::Augmented { description: DescriptionSlot::Hidden, .. }));
    assert_eq!(count(&doc, item, markers::AVATAR_LINK_CLASS), 0);
    assert_eq!(count(&doc, item, markers::DESCRIPTION_CLASS), 0);
    assert_eq!(rec.moves().len(), 1);
}

#[test]
fn fill_fans_out_to_every_placeholder_for_id() {
    let mut doc = FeedBuilder::new()
        .item(FixtureItem::video("aaaaaaaaaaa", "First", "Chan A"))
        .item(FixtureItem::video("aaaaaaaaaaa", "First again", "Chan A"))
        .item(FixtureItem::video("bbbbbbbbbbb", "Second", "Chan B"))
        .build();
    let items = scan_items(&doc);
    let mut rec = Reconciler::new(true);
    for &item in &items {
        rec.reconcile(&mut doc, item, |_| None);
    }
    assert_eq!(fill_placeholders(&mut doc, "aaaaaaaaaaa", "Shared."), 2);
    assert_eq!(fill_placeholders(&mut doc, "bbbbbbbbbbb", ""), 1);
    let states: Vec<Option<&str>> = doc
        .select_all(doc.root(), &Selector::class(markers::DESCRIPTION_CLASS))
        .into_iter()
        .map(|p| doc.attr(p, markers::STATE))
        .collect();
    assert_eq!(states, [Some("ready"), Some("ready"), Some("empty")]);
    assert!(loading_placeholders(&doc).is_empty());
}

#[test]
fn list_layout_attribute_toggles() {
    let (mut doc, _) = feed();
    assert!(!is_list_layout(&doc));
    assert!(set_list_layout(&mut doc, true));
    assert!(is_list_layout(&doc));
    assert!(set_list_layout(&mut doc, false));
    assert!(!is_list_layout(&doc));
    assert!(!set_list_layout(&mut Document::new("about:blank"), true));
}
