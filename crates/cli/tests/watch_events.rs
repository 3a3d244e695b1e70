use cli::watch::is_output_event;
use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use std::path::PathBuf;

fn event(kind: EventKind, path: &str) -> Event {
    Event::new(kind).add_path(PathBuf::from(path))
}

#[test]
fn created_and_written_files_count() {
    assert!(is_output_event(&event(
        EventKind::Create(CreateKind::File),
        "/out/render_0001.png"
    )));
    assert!(is_output_event(&event(
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        "/out/clip.mp4"
    )));
}

#[test]
fn removals_reads_and_dotfiles_are_ignored() {
    assert!(!is_output_event(&event(
        EventKind::Remove(RemoveKind::File),
        "/out/render_0001.png"
    )));
    assert!(!is_output_event(&event(
        EventKind::Access(AccessKind::Any),
        "/out/render_0001.png"
    )));
    assert!(!is_output_event(&event(
        EventKind::Create(CreateKind::File),
        "/out/.render_0001.png.tmp"
    )));
}
