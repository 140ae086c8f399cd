#[allow(dead_code)]
mod common;

use autofill::prelude::*;
use color_eyre::Result;
use common::TestHarness;
use crossterm::event::KeyCode;
use ratatui::style::Modifier;

fn harness(width: u16, height: u16, items: Vec<Arc<dyn AutofillItem>>) -> Result<TestHarness> {
    let opts = AutofillOptionsBuilder::default().placeholder("Search").build()?;
    let mut h = TestHarness::with_size(opts, StaticProvider::new(items), width, height)?;
    h.start()?;
    Ok(h)
}

#[test]
fn popover_under_the_input() -> Result<()> {
    let mut h = harness(30, 6, common::items(&["Rick Sanchez", "Morty Smith", "Summer Smith"]))?;
    insta::assert_snapshot!(h.screen()?.join("\n"), @r"
    > Search                     ▲
    ┌────────────────────────────┐
    │[ ] Rick Sanchez            │
    │[ ] Morty Smith             │
    │[ ] Summer Smith            │
    └────────────────────────────┘
    ");
    Ok(())
}

#[test]
fn chips_push_the_popover_down() -> Result<()> {
    let mut h = harness(30, 6, common::items(&["Rick Sanchez", "Morty Smith", "Summer Smith"]))?;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Enter)?;
    assert_eq!(
        h.screen()?,
        vec![
            " Morty Smith ×",
            "> Search                     ▲",
            "┌────────────────────────────┐",
            "│[ ] Rick Sanchez            │",
            "│[x] Morty Smith             │",
            "└────────────────────────────┘",
        ]
    );
    Ok(())
}

#[test]
fn closed_popover_leaves_only_the_trigger() -> Result<()> {
    let mut h = harness(30, 6, common::items(&["Rick Sanchez"]))?;
    h.type_str("ri")?;
    h.key(KeyCode::Esc)?;
    assert_eq!(h.screen()?, vec!["> ri                         ▼", "", "", "", "", ""]);
    assert_eq!(h.app().cursor_pos, (4, 0));
    Ok(())
}

#[test]
fn details_are_drawn_under_the_name() -> Result<()> {
    let items: Vec<Arc<dyn AutofillItem>> = vec![
        Arc::new(DefaultItem::new(1, "Rick Sanchez").with_field("species", "Human")),
        Arc::new(DefaultItem::new(2, "Birdperson").with_field("species", "Bird-Person")),
    ];
    let mut h = harness(30, 7, items)?;
    let screen = h.screen()?;
    assert_eq!(screen[2], "│[ ] Rick Sanchez            │");
    assert_eq!(screen[3], "│    species: Human          │");
    assert_eq!(screen[4], "│[ ] Birdperson              │");
    assert_eq!(screen[5], "│    species: Bird-Person    │");
    Ok(())
}

#[test]
fn matches_follow_the_settled_query() -> Result<()> {
    let opts = AutofillOptionsBuilder::default().color(Some("none".to_string())).build()?;
    let mut h = TestHarness::with_size(opts, common::characters(), 30, 6)?;
    h.start()?;
    h.type_str("mor")?;
    h.wait_debounce()?;
    assert_eq!(h.screen()?[2], "│[ ] Morty Smith             │");
    let bold = |h: &TestHarness, x| h.modifier_at(x, 2).contains(Modifier::BOLD);
    assert!((5..8).all(|x| bold(&h, x)));
    assert!(!bold(&h, 8));

    // still "mor" until the next search lands
    h.char('t')?;
    h.screen()?;
    assert!(!bold(&h, 8));

    h.wait_debounce()?;
    h.screen()?;
    assert!((5..9).all(|x| bold(&h, x)));
    assert!(!bold(&h, 9));
    Ok(())
}

#[test]
fn popover_shrinks_to_the_rows_left() -> Result<()> {
    // one chip per row pushes the input down to row 5
    let names = ["Rick", "Morty", "Summer", "Beth", "Jerry"];
    let mut h = harness(12, 12, common::items(&names))?;
    for _ in 0..names.len() {
        h.key(KeyCode::Down)?;
        h.key(KeyCode::Enter)?;
    }
    assert_eq!(h.value_names().len(), 5);
    let screen = h.screen()?;
    // seven rows wanted, six left under the input
    assert_eq!(screen[5], "> Search   ▲");
    assert_eq!(screen[6], "┌──────────┐");
    assert_eq!(screen[11], "└──────────┘");
    Ok(())
}
