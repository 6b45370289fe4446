use editor_engine::{
    ChangeSource, Delta, Engine, EngineError, EngineOptions, Key, KeyEvent, SelectionRange,
};
use editor_engine_footnote::{
    FOOTNOTE_MODULE, FootnoteModule, NOTE_ATTRIBUTE, REF_ATTRIBUTE, keyboard_bindings, register,
};

fn footnote_engine() -> Engine {
    register();
    let options = EngineOptions {
        keymap: keyboard_bindings(),
        modules: vec![FOOTNOTE_MODULE.to_string()],
        ..EngineOptions::default()
    };
    Engine::new(options).unwrap()
}

#[test]
fn register_is_idempotent_across_engines() {
    let first = footnote_engine();
    let second = footnote_engine();
    assert!(first.has_module(FOOTNOTE_MODULE));
    assert!(second.has_module(FOOTNOTE_MODULE));
}

#[test]
fn dispatch_add_inserts_addressable_footnotes() {
    let mut engine = footnote_engine();
    engine
        .set_contents(Delta::new().insert("body"), ChangeSource::Api)
        .unwrap();

    for _ in 0..3 {
        engine
            .dispatch(FOOTNOTE_MODULE, "add", "", ChangeSource::Api)
            .unwrap();
    }

    let module = engine.module::<FootnoteModule>(FOOTNOTE_MODULE).unwrap();
    assert_eq!(module.footnotes().len(), 3);

    let markers = engine.document().spans_with(REF_ATTRIBUTE);
    let notes = engine.document().spans_with(NOTE_ATTRIBUTE);
    assert_eq!(markers.len(), 3);
    assert_eq!(notes.len(), 3);

    // Every footnote id appears on exactly one marker and one entry.
    for entry in module.footnotes() {
        assert_eq!(
            markers.iter().filter(|(_, id)| *id == entry.id.into()).count(),
            1
        );
        assert_eq!(
            notes.iter().filter(|(_, id)| *id == entry.id.into()).count(),
            1
        );
    }
}

#[test]
fn dispatch_to_missing_module_fails() {
    let mut engine = Engine::new(EngineOptions::default()).unwrap();
    assert_eq!(
        engine.dispatch(FOOTNOTE_MODULE, "add", "", ChangeSource::Api),
        Err(EngineError::ModuleMissing(FOOTNOTE_MODULE.to_string()))
    );
}

#[test]
fn backspace_after_marker_removes_whole_footnote() {
    let mut engine = footnote_engine();
    engine
        .set_contents(Delta::new().insert("body"), ChangeSource::Api)
        .unwrap();
    engine
        .dispatch(FOOTNOTE_MODULE, "add", "first", ChangeSource::Api)
        .unwrap();
    assert_eq!(engine.text(), "body[1]\n1. first\n");

    // Caret right behind the marker.
    engine
        .set_selection(Some(SelectionRange::caret(7)), ChangeSource::Api)
        .unwrap();
    assert!(engine.input_key(KeyEvent::plain(Key::Backspace)).unwrap());

    assert_eq!(engine.text(), "body");
    let module = engine.module::<FootnoteModule>(FOOTNOTE_MODULE).unwrap();
    assert!(module.footnotes().is_empty());
}

#[test]
fn backspace_elsewhere_falls_back_to_plain_delete() {
    let mut engine = footnote_engine();
    engine
        .set_contents(Delta::new().insert("body"), ChangeSource::Api)
        .unwrap();
    engine
        .set_selection(Some(SelectionRange::caret(4)), ChangeSource::Api)
        .unwrap();

    assert!(engine.input_key(KeyEvent::plain(Key::Backspace)).unwrap());
    assert_eq!(engine.text(), "bod");
}

#[test]
fn remove_by_id_renumbers_content() {
    let mut engine = footnote_engine();
    engine
        .set_contents(Delta::new().insert("body"), ChangeSource::Api)
        .unwrap();
    engine
        .dispatch(FOOTNOTE_MODULE, "add", "one", ChangeSource::Api)
        .unwrap();
    engine
        .dispatch(FOOTNOTE_MODULE, "add", "two", ChangeSource::Api)
        .unwrap();

    let first_id = engine
        .module::<FootnoteModule>(FOOTNOTE_MODULE)
        .unwrap()
        .footnotes()[0]
        .id;
    engine
        .dispatch(
            FOOTNOTE_MODULE,
            "remove",
            &first_id.to_string(),
            ChangeSource::Api,
        )
        .unwrap();

    assert_eq!(engine.text(), "body[1]\n1. two\n");
    let module = engine.module::<FootnoteModule>(FOOTNOTE_MODULE).unwrap();
    assert_eq!(module.footnotes().len(), 1);
    assert_eq!(module.footnotes()[0].number, 1);
    assert_eq!(module.footnotes()[0].content, "two");
}

#[test]
fn unknown_command_is_an_error() {
    let mut engine = footnote_engine();
    let err = engine
        .dispatch(FOOTNOTE_MODULE, "frobnicate", "", ChangeSource::Api)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Module("unknown footnote command 'frobnicate'".to_string())
    );
}
