use std::cell::Cell;
use std::rc::Rc;
use tuber::backend::RecordingGpu;
use tuber::keyboard::{Key, KeyTranslation};
use tuber::render::Shader;
use tuber::style::{BorderWidths, DrawState, PropertyValue, Style, TextureDefinition};
use tuber::stylequad::StyleChanges;
use tuber::text::{Font, FontManager, FontMetrics, Glyph};
use tuber::utils::{Color, MouseInfo, Position, Rectangle};
use tuber::widgets::{Button, Element, Label};

fn test_font() -> Font {
    let mut font = Font::new(FontMetrics {
        size: 10.0,
        height: 12.0,
        ascender: 9.0,
        descender: -3.0,
    });
    for c in ['A', 'V'] {
        font.insert_glyph(Glyph {
            codepoint: c,
            width: 6.0,
            height: 8.0,
            offset_x: 0.0,
            offset_y: 8.0,
            advance_x: 7.0,
            s0: 0.0,
            t0: 0.0,
            s1: 0.5,
            t1: 0.5,
            kerning: Vec::new(),
        });
    }
    font
}

fn setup() -> (RecordingGpu, Rc<FontManager<RecordingGpu>>) {
    let mut gpu = RecordingGpu::new();
    let mut fm = FontManager::new(&mut gpu, 64).unwrap();
    fm.insert_font(test_font());
    (gpu, Rc::new(fm))
}

fn button_style() -> Rc<Style> {
    let mut style = Style::new("button");
    style.set(
        DrawState::Normal,
        "background-color",
        PropertyValue::Color(Color::rgba(1.0, 0.0, 0.0, 1.0)),
    );
    style.set(DrawState::Normal, "color", PropertyValue::Color(Color::WHITE));
    style.set(
        DrawState::Hover,
        "background-color",
        PropertyValue::Color(Color::rgba(0.0, 1.0, 0.0, 1.0)),
    );
    Rc::new(style)
}

fn counter() -> (Rc<Cell<u32>>, Box<dyn Fn()>) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    (count, Box::new(move || inner.set(inner.get() + 1)))
}

fn mouse(x: f32, y: f32, down: bool, clicked: bool) -> MouseInfo {
    MouseInfo {
        is_lmb_down: down,
        is_lmb_clicked: clicked,
        mouse_pos: Position { x, y },
        ..Default::default()
    }
}

fn key(key: Key, character: Option<char>) -> KeyTranslation {
    KeyTranslation { key, character }
}

const RECT: Rectangle = Rectangle {
    x: 0.0,
    y: 0.0,
    width: 100.0,
    height: 40.0,
};

#[test]
fn label_natural_size_includes_padding() {
    let (mut gpu, fm) = setup();
    let label = Label::new(&mut gpu, fm, button_style(), "AV").unwrap();
    let size = label.natural_size();
    // 13 wide, then size * 2 padding
    assert_eq!(size.width, 33.0);
    assert_eq!(size.height, 18.0);
}

#[test]
fn label_centres_its_text() {
    let (mut gpu, fm) = setup();
    let mut label = Label::new(&mut gpu, fm, button_style(), "AV").unwrap();
    label.layout(&mut gpu, RECT).unwrap();
    assert_eq!(label.text_position(), Position { x: 43.0, y: 14.0 });
    assert!(!label.is_dirty());
}

#[test]
fn label_draws_with_the_colour_of_its_last_style_pass() {
    let (mut gpu, fm) = setup();
    let green = Color::rgba(0.0, 1.0, 0.0, 1.0);
    let mut style = Style::new("label");
    style.set(DrawState::Normal, "color", PropertyValue::Color(Color::WHITE));
    style.set(DrawState::Hover, "color", PropertyValue::Color(green));

    let mut label = Label::new(&mut gpu, fm.clone(), Rc::new(style), "AV").unwrap();
    // nothing resolved yet
    label.draw(&mut gpu);
    assert_eq!(gpu.take_draws()[0].color, fm.default_fg());

    label.update_style(&mut gpu).unwrap();
    label.draw(&mut gpu);
    assert_eq!(gpu.take_draws()[0].color, Color::WHITE);

    label.state_mut().set_draw_state(DrawState::Hover);
    label.draw(&mut gpu);
    assert_eq!(gpu.take_draws()[0].color, Color::WHITE);

    let changes = label.update_style(&mut gpu).unwrap();
    assert_eq!(changes, StyleChanges::FG_COLOR);
    label.draw(&mut gpu);
    assert_eq!(gpu.take_draws()[0].color, green);
}

#[test]
fn style_pass_marks_dirty_once_per_change() {
    let (mut gpu, fm) = setup();
    let mut button = Button::new(&mut gpu, fm, button_style(), "AV", None).unwrap();
    assert!(button.is_dirty());

    let changes = button.update_style(&mut gpu).unwrap();
    assert!(changes.contains(StyleChanges::BG_COLOR));
    assert!(changes.contains(StyleChanges::FG_COLOR));
    assert_eq!(button.state().dirty_marks(), 1);

    button.layout(&mut gpu, RECT).unwrap();
    assert!(!button.is_dirty());

    // nothing changed
    assert!(button.update_style(&mut gpu).unwrap().is_empty());
    assert_eq!(button.state().dirty_marks(), 1);
    assert!(!button.is_dirty());
}

#[test]
fn hover_and_press_change_the_draw_state() {
    let (mut gpu, fm) = setup();
    let mut button = Button::new(&mut gpu, fm, button_style(), "AV", None).unwrap();
    button.update_style(&mut gpu).unwrap();
    button.layout(&mut gpu, RECT).unwrap();

    assert!(!button.handle_mouse(mouse(50.0, 20.0, false, false)));
    assert_eq!(button.draw_state(), DrawState::Hover);
    assert!(button.is_dirty());

    let marks = button.state().dirty_marks();
    let changes = button.update_style(&mut gpu).unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes.contains(StyleChanges::BG_COLOR));
    assert_eq!(button.state().dirty_marks(), marks + 1);

    button.handle_mouse(mouse(50.0, 20.0, true, false));
    assert_eq!(button.draw_state(), DrawState::Active);

    button.handle_mouse(mouse(150.0, 20.0, false, false));
    assert_eq!(button.draw_state(), DrawState::Normal);
}

#[test]
fn click_fires_the_callback() {
    let (mut gpu, fm) = setup();
    let (count, callback) = counter();
    let mut button = Button::new(&mut gpu, fm, button_style(), "AV", Some(callback)).unwrap();
    button.layout(&mut gpu, RECT).unwrap();

    assert!(!button.handle_mouse(mouse(150.0, 20.0, false, true)));
    assert_eq!(count.get(), 0);

    assert!(button.handle_mouse(mouse(10.0, 10.0, false, true)));
    assert_eq!(count.get(), 1);
}

#[test]
fn keys_activate_only_when_focused() {
    let (mut gpu, fm) = setup();
    let (count, callback) = counter();
    let mut button = Button::new(&mut gpu, fm, button_style(), "AV", Some(callback)).unwrap();

    assert!(!button.handle_key(key(Key::Enter, None)));
    assert_eq!(count.get(), 0);

    button.set_focus(true);
    assert_eq!(button.draw_state(), DrawState::Focus);

    assert!(button.handle_key(key(Key::Enter, None)));
    assert!(button.handle_key(key(Key::NumpadEnter, None)));
    assert!(button.handle_key(key(Key::Normal, Some(' '))));
    assert!(!button.handle_key(key(Key::Normal, Some('x'))));
    assert!(!button.handle_key(key(Key::Tab, None)));
    assert_eq!(count.get(), 3);
}

#[test]
fn button_draws_quad_then_text() {
    let (mut gpu, fm) = setup();
    let mut button = Button::new(&mut gpu, fm, button_style(), "AV", None).unwrap();
    button.update_style(&mut gpu).unwrap();
    button.layout(&mut gpu, RECT).unwrap();
    button.draw(&mut gpu);

    let draws = gpu.draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].shader, Some(Shader::StyleQuad));
    assert_eq!(draws[0].color, Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(draws[0].position, (50.0, 20.0));
    assert_eq!(draws[1].shader, Some(Shader::Alpha));
    assert_eq!(draws[1].color, Color::WHITE);
}

#[test]
fn failed_style_pass_leaves_the_button_dirty() {
    let (mut gpu, fm) = setup();
    let mut style = Style::new("framed");
    let frame = TextureDefinition::from_bgra(
        4,
        4,
        vec![255; 64],
        BorderWidths::uniform(1),
        false,
    );
    style.set(DrawState::Normal, "border-image", PropertyValue::Texture(Rc::new(frame)));

    let mut button = Button::new(&mut gpu, fm, Rc::new(style), "AV", None).unwrap();
    button.layout(&mut gpu, RECT).unwrap();
    assert!(!button.is_dirty());

    gpu.fail_next_upload();
    assert!(button.update_style(&mut gpu).is_err());
    assert!(button.is_dirty());
    assert!(button.quad().border_image().is_none());

    // next pass retries the upload
    button.update_style(&mut gpu).unwrap();
    assert!(button.quad().border_image().is_some());
}
