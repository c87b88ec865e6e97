use statefold::{
    apply_middleware, combine_reducers_with, create_store, Action, Diagnostics, Middleware,
    ReducerMap, State, Store,
};
use statefold_middleware::{deferred, DeferredMiddleware, Dispatcher, LoggingMiddleware};
use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};
use std::rc::Rc;

mod commands;
mod config;
mod logger;
mod reducers;

use commands::Command;
use config::DemoConfig;

fn main() -> anyhow::Result<()> {
    let log_target = logger::init()?;
    log::info!("Starting statefold-demo, logging to {}", log_target);

    let config = DemoConfig::load();
    let (dispatcher, deferred_middleware) = deferred();
    let store = build_store(&config, deferred_middleware)?;

    watch_milestone(&store, dispatcher, config.milestone);
    let _printer = print_changes(&store);

    println!("{}", commands::HELP);
    let result = run(&store, &config);

    log::info!("Exiting statefold-demo");
    result
}

fn build_store(
    config: &DemoConfig,
    deferred_middleware: DeferredMiddleware,
) -> anyhow::Result<Store> {
    let mode = config.mode();
    log::info!("Running in {} mode", mode);

    let reducer = combine_reducers_with(
        ReducerMap::new()
            .with("counter", reducers::counter())
            .with("todos", reducers::todos()),
        Diagnostics::from_mode(mode),
    );

    let mut logging = LoggingMiddleware::new().with_state(config.log_state);
    for action_type in &config.skip_actions {
        logging = logging.skip(action_type.clone());
    }

    // Add middleware in order (the first one sees actions first)
    let middleware: Vec<Rc<dyn Middleware>> = vec![
        Rc::new(deferred_middleware) as Rc<dyn Middleware>,
        Rc::new(logging) as Rc<dyn Middleware>,
    ];

    let preloaded = State::record([("counter", State::from(config.initial_count))]);
    Ok(create_store(
        reducer,
        Some(preloaded),
        Some(apply_middleware(middleware)),
    )?)
}

/// Queue a celebration todo the first time the counter reaches `milestone`
fn watch_milestone(store: &Store, dispatcher: Dispatcher, milestone: i64) {
    let watched = store.downgrade();
    let reached = Cell::new(false);
    store.subscribe(move || {
        let Some(watched) = watched.upgrade() else {
            return;
        };
        let count = watched.get_state().get("counter").and_then(State::as_i64);
        if count == Some(milestone) && !reached.replace(true) {
            // Dispatching from a listener is rejected; queue it instead
            let text = format!("celebrate reaching {}", milestone);
            dispatcher.dispatch(Action::new(reducers::ADD_TODO).with("text", text));
        }
    });
}

/// Print the state whenever it actually changed
fn print_changes(store: &Store) -> statefold::Subscription {
    let last: RefCell<Option<State>> = RefCell::new(None);
    store.observable().subscribe(move |state: &State| {
        let mut last = last.borrow_mut();
        if last.as_ref().is_some_and(|previous| previous.same(state)) {
            return;
        }
        println!("{}", state);
        *last = Some(state.clone());
    })
}

fn run(store: &Store, config: &DemoConfig) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", config.prompt);
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match commands::parse(&line) {
            Ok(Command::Dispatch(action)) => {
                if let Err(e) = store.dispatch(action) {
                    log::error!("Dispatch failed: {}", e);
                    eprintln!("error: {}", e);
                }
            }
            Ok(Command::ShowState) => println!("{}", store.get_state()),
            Ok(Command::Help) => println!("{}", commands::HELP),
            Ok(Command::Quit) => return Ok(()),
            Err(message) => eprintln!("{}", message),
        }
    }
}
