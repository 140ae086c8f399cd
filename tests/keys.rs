#[allow(dead_code)]
mod common;

use autofill::prelude::*;
use color_eyre::Result;
use common::{TestHarness, characters};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn option_cursor(h: &TestHarness) -> Option<usize> {
    h.app().navigation().option_cursor()
}

fn value_cursor(h: &TestHarness) -> Option<usize> {
    h.app().navigation().value_cursor()
}

/// Highlights each option in turn and toggles it
fn select_first(h: &mut TestHarness, count: usize) -> Result<()> {
    for _ in 0..count {
        h.key(KeyCode::Down)?;
        h.key(KeyCode::Enter)?;
    }
    Ok(())
}

#[test]
fn arrows_move_through_options() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    assert!(h.is_open());
    assert_eq!(option_cursor(&h), None);

    h.key(KeyCode::Down)?;
    assert_eq!(option_cursor(&h), Some(0));
    for _ in 0..10 {
        h.key(KeyCode::Down)?;
    }
    assert_eq!(option_cursor(&h), Some(5));
    h.key(KeyCode::Up)?;
    assert_eq!(option_cursor(&h), Some(4));
    for _ in 0..10 {
        h.key(KeyCode::Up)?;
    }
    assert_eq!(option_cursor(&h), Some(0));
    Ok(())
}

#[test]
fn escape_closes_and_down_reopens() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    select_first(&mut h, 2)?;
    h.key(KeyCode::Right)?;
    h.key(KeyCode::Right)?;
    assert_eq!(option_cursor(&h), Some(1));
    assert_eq!(value_cursor(&h), Some(1));

    h.key(KeyCode::Esc)?;
    assert!(!h.is_open());
    assert_eq!(option_cursor(&h), None);
    assert_eq!(value_cursor(&h), None);

    // closed: up does nothing, down only opens
    h.key(KeyCode::Up)?;
    assert!(!h.is_open());
    h.key(KeyCode::Down)?;
    assert!(h.is_open());
    assert_eq!(option_cursor(&h), None);
    assert_eq!(value_cursor(&h), None);
    Ok(())
}

#[test]
fn losing_focus_closes_the_popover() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    h.key(KeyCode::Down)?;
    assert_eq!(option_cursor(&h), Some(0));

    h.send(Event::FocusLost)?;
    assert!(!h.is_open());
    assert_eq!(option_cursor(&h), None);

    h.send(Event::FocusGained)?;
    assert!(h.is_open());
    assert_eq!(option_cursor(&h), None);
    Ok(())
}

#[test]
fn typing_does_not_open_the_popover() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    h.key(KeyCode::Esc)?;
    h.type_str("mor")?;
    h.wait_debounce()?;
    assert!(!h.is_open());
    assert_eq!(h.option_names(), vec!["Morty Smith"]);
    Ok(())
}

#[test]
fn enter_toggles_the_highlighted_option() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    h.key(KeyCode::Enter)?;
    assert!(h.changes.is_empty());

    h.key(KeyCode::Down)?;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Enter)?;
    assert_eq!(h.value_names(), vec!["Morty Smith"]);
    // the cursor stays where it was
    assert_eq!(option_cursor(&h), Some(1));

    h.key(KeyCode::Enter)?;
    assert!(h.value_names().is_empty());
    assert_eq!(h.changes.len(), 2);
    Ok(())
}

#[test]
fn selection_keeps_the_toggle_order() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Enter)?;
    h.key(KeyCode::Up)?;
    h.key(KeyCode::Up)?;
    h.key(KeyCode::Enter)?;
    assert_eq!(h.value_names(), vec!["Summer Smith", "Rick Sanchez"]);
    Ok(())
}

#[test]
fn values_are_browsed_and_deleted() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    select_first(&mut h, 3)?;
    assert_eq!(h.value_names(), vec!["Rick Sanchez", "Morty Smith", "Summer Smith"]);

    h.key(KeyCode::Left)?;
    assert_eq!(value_cursor(&h), Some(0));
    for _ in 0..5 {
        h.key(KeyCode::Right)?;
    }
    assert_eq!(value_cursor(&h), Some(2));

    // removing the last value steps back
    h.key(KeyCode::Delete)?;
    assert_eq!(h.value_names(), vec!["Rick Sanchez", "Morty Smith"]);
    assert_eq!(value_cursor(&h), Some(1));

    h.key(KeyCode::Left)?;
    h.key(KeyCode::Delete)?;
    // removing from the front keeps the index, now on the next value
    assert_eq!(h.value_names(), vec!["Morty Smith"]);
    assert_eq!(value_cursor(&h), Some(0));

    h.key(KeyCode::Delete)?;
    assert!(h.value_names().is_empty());
    assert_eq!(value_cursor(&h), None);
    Ok(())
}

#[test]
fn refused_removal_keeps_the_value_cursor() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    select_first(&mut h, 3)?;
    h.key(KeyCode::Right)?;
    h.key(KeyCode::Right)?;
    h.key(KeyCode::Right)?;
    assert_eq!(value_cursor(&h), Some(2));

    h.accept_changes = false;
    h.key(KeyCode::Delete)?;
    assert_eq!(h.changes.last().map(|c| c.len()), Some(2));

    // the owner answers with the list it already had
    let unchanged = h.app().value().clone();
    h.autofill.app_mut().set_value(unchanged);
    assert_eq!(h.value_names().len(), 3);
    assert_eq!(value_cursor(&h), Some(2));

    // an accepted removal still steps back
    h.accept_changes = true;
    h.key(KeyCode::Delete)?;
    assert_eq!(h.value_names(), vec!["Rick Sanchez", "Morty Smith"]);
    assert_eq!(value_cursor(&h), Some(1));
    Ok(())
}

#[test]
fn delete_edits_the_text_without_a_highlighted_value() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    select_first(&mut h, 1)?;
    h.type_str("ab")?;
    h.key(KeyCode::Home)?;
    h.key(KeyCode::Delete)?;
    assert_eq!(h.query(), "b");
    assert_eq!(h.value_names(), vec!["Rick Sanchez"]);
    Ok(())
}

#[test]
fn proposals_are_not_applied_by_the_widget() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    h.accept_changes = false;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Enter)?;
    assert_eq!(h.changes.len(), 1);
    assert_eq!(h.changes[0].ids(), vec![1]);
    assert!(h.value_names().is_empty());

    // the owner decides on something else
    let chosen = common::items(&["Beth Smith"]).into_iter().collect();
    h.autofill.app_mut().set_value(chosen);
    assert_eq!(h.value_names(), vec!["Beth Smith"]);
    Ok(())
}

#[test]
fn option_cursor_is_kept_inside_new_results() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    for _ in 0..6 {
        h.key(KeyCode::Down)?;
    }
    assert_eq!(option_cursor(&h), Some(5));

    h.type_str("smith")?;
    h.wait_debounce()?;
    assert_eq!(h.option_names().len(), 4);
    assert_eq!(option_cursor(&h), Some(3));

    h.ctrl('u')?;
    h.type_str("zzz")?;
    h.wait_debounce()?;
    assert_eq!(option_cursor(&h), None);
    Ok(())
}

#[test]
fn line_editing() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    h.type_str("rick c-137")?;
    h.ctrl('w')?;
    assert_eq!(h.query(), "rick ");
    h.send(Event::Key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT)))?;
    assert_eq!(h.query(), "");

    h.type_str("morty")?;
    h.ctrl('a')?;
    h.char('>')?;
    h.ctrl('e')?;
    h.char('<')?;
    assert_eq!(h.query(), ">morty<");
    h.key(KeyCode::Backspace)?;
    h.ctrl('b')?;
    h.ctrl('d')?;
    assert_eq!(h.query(), ">mort");
    h.ctrl('u')?;
    assert_eq!(h.query(), "");
    Ok(())
}

#[test]
fn unfocused_widget_ignores_keys() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    h.send(Event::FocusLost)?;
    h.type_str("rick")?;
    h.key(KeyCode::Down)?;
    assert_eq!(h.query(), "");
    assert_eq!(option_cursor(&h), None);

    h.send(Event::FocusGained)?;
    h.char('r')?;
    assert_eq!(h.query(), "r");
    Ok(())
}

#[test]
fn custom_bindings() -> Result<()> {
    let opts = AutofillOptionsBuilder::default()
        .bind(vec!["ctrl-x:clear-selection".to_string(), "enter:toggle-option+close-popover".to_string()])
        .build()?;
    let mut h = TestHarness::new(opts, characters())?;
    h.start()?;

    select_first(&mut h, 1)?;
    assert_eq!(h.value_names(), vec!["Rick Sanchez"]);
    assert!(!h.is_open());

    h.ctrl('x')?;
    assert!(h.value_names().is_empty());
    Ok(())
}

#[test]
fn tab_accepts() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    select_first(&mut h, 2)?;
    h.type_str("sm")?;
    h.key(KeyCode::Tab)?;
    assert!(h.autofill.should_quit());

    let output = h.output();
    assert!(!output.is_abort);
    assert_eq!(output.query, "sm");
    let names: Vec<_> = output.selected.iter().map(|i| i.name().into_owned()).collect();
    assert_eq!(names, vec!["Rick Sanchez", "Morty Smith"]);
    Ok(())
}

#[test]
fn ctrl_c_aborts() -> Result<()> {
    let mut h = TestHarness::started(characters())?;
    select_first(&mut h, 1)?;
    h.ctrl('c')?;
    assert!(h.autofill.should_quit());
    assert!(h.output().is_abort);
    Ok(())
}
