use std::cell::RefCell;
use std::collections::HashSet;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{mpsc, Arc, RwLock};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use shelf_core::{
    update, DetailUriTemplate, EventBus, GridOptions, GridRender, LiveRemovalSync, Msg,
    ResultGridView, ResultSet, SharedGrid, ShellState,
};
use shelf_engine::{EngineEvent, PresentationRequest, ReqwestCatalogClient, Section, SectionList};
use shelf_logging::{shelf_info, shelf_warn, LogDestination};

use super::config::{load_config, CONFIG_FILENAME};
use super::effects::EffectRunner;
use super::ui::render;

const CONFIG_ENV: &str = "SHELF_CONFIG";

enum AppInput {
    Line(String),
    Closed,
    SectionsSettled { mount_id: u64, sections: SectionList },
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Remove(String),
    Quit,
    Ignore,
}

fn parse_command(line: &str) -> Command {
    if line.trim().is_empty() {
        return Command::Ignore;
    }
    if line.trim() == ":quit" {
        return Command::Quit;
    }
    if let Some(id) = line.trim().strip_prefix(":remove") {
        return Command::Remove(id.trim().to_string());
    }
    Command::Search(line.to_string())
}

pub fn run_app() -> anyhow::Result<()> {
    shelf_logging::initialize(LogDestination::File, LevelFilter::Info);

    let config_path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let config = load_config(&config_path);

    let installed = Arc::new(RwLock::new(config.installed_ids()));
    let client = ReqwestCatalogClient::new(config.client_settings())
        .context("building catalog client")?;
    let bus = EventBus::new();
    let runner = EffectRunner::new(Arc::new(client), installed.clone(), bus.clone())?;

    let (input_tx, input_rx) = mpsc::channel::<AppInput>();
    spawn_stdin_reader(input_tx.clone());

    let mut page = Page {
        shell: ShellState::new(),
        mounted: None,
        bus,
        options: config.grid_options(),
        installed,
        runner,
        input_tx,
        next_mount_id: 0,
    };
    println!("{}", render::render_status(&page.shell.view()));

    let interval = Duration::from_millis(20);
    loop {
        while let Ok(input) = input_rx.try_recv() {
            if !page.handle_input(input) {
                shelf_info!("Shutting down");
                return Ok(());
            }
        }
        while let Some(event) = page.runner.try_recv() {
            page.handle_engine_event(event);
        }
        page.flush_status();
        thread::sleep(interval);
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(AppInput::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(AppInput::Closed);
    });
}

/// The one mounted search view. Dropping it tears down its removal listener.
struct MountedView {
    mount_id: u64,
    title: String,
    sections: Rc<RefCell<Option<SectionList>>>,
    grid: SharedGrid,
    sync: LiveRemovalSync,
    /// Lines of the most recent full re-render.
    last_frame: Rc<RefCell<Vec<String>>>,
}

impl MountedView {
    fn new(
        mount_id: u64,
        title: String,
        results: ResultSet,
        options: GridOptions,
        bus: &EventBus,
    ) -> Self {
        let grid: SharedGrid = Rc::new(RefCell::new(ResultGridView::new(
            results,
            options,
            &DetailUriTemplate::default(),
        )));
        let sections = Rc::new(RefCell::new(None));
        let last_frame = Rc::new(RefCell::new(Vec::new()));
        let sync = {
            let title = title.clone();
            let sections = Rc::clone(&sections);
            let last_frame = Rc::clone(&last_frame);
            LiveRemovalSync::attach(bus, Rc::clone(&grid), move |rendered| {
                let lines = frame_lines(&title, sections.borrow().as_deref(), &rendered);
                print_lines(lines.iter().cloned());
                *last_frame.borrow_mut() = lines;
            })
        };
        Self {
            mount_id,
            title,
            sections,
            grid,
            sync,
            last_frame,
        }
    }

    /// Full frame for the current grid state.
    fn render(&self) -> Vec<String> {
        let rendered = {
            let mut view = self.grid.borrow_mut();
            view.consume_dirty();
            view.render()
        };
        let lines = frame_lines(&self.title, self.sections.borrow().as_deref(), &rendered);
        *self.last_frame.borrow_mut() = lines.clone();
        lines
    }

    /// Stores sections from the retrieval started for this mount. Returns the
    /// new header, or `None` when they belong to a different mount.
    fn accept_sections(&self, mount_id: u64, sections: SectionList) -> Option<Vec<String>> {
        if mount_id != self.mount_id {
            return None;
        }
        let header = render::render_header(&self.title, Some(&sections));
        *self.sections.borrow_mut() = Some(sections);
        Some(header)
    }
}

fn frame_lines(title: &str, sections: Option<&[Section]>, grid: &GridRender) -> Vec<String> {
    let mut lines = render::render_header(title, sections);
    lines.extend(render::render_grid(grid));
    lines
}

struct Page {
    shell: ShellState,
    mounted: Option<MountedView>,
    bus: EventBus,
    options: GridOptions,
    installed: Arc<RwLock<HashSet<String>>>,
    runner: EffectRunner,
    input_tx: mpsc::Sender<AppInput>,
    next_mount_id: u64,
}

impl Page {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.shell);
        let (state, effects) = update(state, msg);
        self.shell = state;
        self.runner.enqueue(effects);
    }

    /// Returns false when the app should exit.
    fn handle_input(&mut self, input: AppInput) -> bool {
        match input {
            AppInput::Line(line) => match parse_command(&line) {
                Command::Search(query) => self.dispatch(Msg::QuerySubmitted(query)),
                Command::Remove(id) => {
                    if let Ok(mut installed) = self.installed.write() {
                        installed.remove(&id);
                    }
                    self.dispatch(Msg::SnapRemoved { id });
                }
                Command::Quit => return false,
                Command::Ignore => {}
            },
            AppInput::Closed => return false,
            AppInput::SectionsSettled { mount_id, sections } => {
                if let Some(header) = self
                    .mounted
                    .as_ref()
                    .and_then(|view| view.accept_sections(mount_id, sections))
                {
                    print_lines(header);
                }
            }
        }
        true
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Presented(request) => self.mount(request),
            EngineEvent::QueryFailed { query, error } => {
                shelf_warn!("Query {:?} failed: {}", query, error);
                self.dispatch(Msg::QueryFailed {
                    query,
                    reason: error.to_string(),
                });
            }
        }
    }

    fn mount(&mut self, request: PresentationRequest) {
        // Tear down the previous view before the new one subscribes.
        self.mounted = None;

        self.next_mount_id += 1;
        let mount_id = self.next_mount_id;
        let query = request.query().to_string();
        let title = request.title().to_string();
        {
            let tx = self.input_tx.clone();
            let _ = request
                .sections()
                .on_settled(self.runner.engine().runtime(), move |sections| {
                    let _ = tx.send(AppInput::SectionsSettled { mount_id, sections });
                });
        }

        let results = request.into_results();
        let result_count = results.len();
        let view = MountedView::new(mount_id, title, results, self.options.clone(), &self.bus);
        print_lines(view.render());
        self.mounted = Some(view);
        self.dispatch(Msg::ResultsMounted {
            query,
            result_count,
        });
    }

    fn flush_status(&mut self) {
        if let Some(view) = &self.mounted {
            view.sync.flush_pending();
        }
        if self.shell.consume_dirty() {
            let mut status = render::render_status(&self.shell.view());
            if let Some(view) = &self.mounted {
                status.push_str(&format!(" | {} on screen", view.grid.borrow().results().len()));
            }
            println!("{status}");
        }
    }
}

fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use shelf_core::{EventBus, GridOptions, Record, ResultSet, StoreEvent};
    use shelf_engine::Section;

    use super::{parse_command, Command, MountedView};

    fn mounted(mount_id: u64, bus: &EventBus) -> MountedView {
        let results = ResultSet::from_records(vec![
            Record::new("a1", "Alpha"),
            Record::new("b2", "Beta"),
        ]);
        MountedView::new(
            mount_id,
            "Results for \"notes\"".to_string(),
            results,
            GridOptions::default(),
            bus,
        )
    }

    fn sections() -> Vec<Section> {
        vec![Section("featured".to_string()), Section("tools".to_string())]
    }

    #[test]
    fn plain_text_is_a_search_kept_verbatim() {
        assert_eq!(
            parse_command("  notes app "),
            Command::Search("  notes app ".to_string())
        );
    }

    #[test]
    fn colon_commands_are_recognised() {
        assert_eq!(parse_command(":remove a1"), Command::Remove("a1".to_string()));
        assert_eq!(parse_command(" :quit "), Command::Quit);
        assert_eq!(parse_command("   "), Command::Ignore);
    }

    #[test]
    fn sections_from_an_earlier_mount_are_ignored() {
        let bus = EventBus::new();
        let view = mounted(2, &bus);
        assert_eq!(view.accept_sections(1, sections()), None);
        assert!(view
            .render()
            .contains(&"Sections: loading…".to_string()));
    }

    #[test]
    fn sections_for_the_current_mount_are_shown() {
        let bus = EventBus::new();
        let view = mounted(3, &bus);
        let header = view.accept_sections(3, sections()).unwrap();
        assert!(header.contains(&"Sections: featured | tools".to_string()));
    }

    #[test]
    fn removal_rerender_keeps_the_sections_line() {
        let bus = EventBus::new();
        let view = mounted(1, &bus);
        view.accept_sections(1, sections()).unwrap();

        let delivered = bus.publish(&StoreEvent::SnapRemoved {
            id: "a1".to_string(),
        });
        assert_eq!(delivered, 1);

        let frame = view.last_frame.borrow().clone();
        assert_eq!(frame[0], "Results for \"notes\"");
        assert!(frame.contains(&"Sections: featured | tools".to_string()));
        assert_eq!(view.grid.borrow().results().ids(), vec!["b2"]);
    }
}
