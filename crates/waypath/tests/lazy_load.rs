use futures::executor::block_on;
use std::cell::Cell;
use std::rc::Rc;
use waypath::{
    from_fn, Cli, CommandInput, CommandOutput, DispatchError, MemoryLogger, Outcome, Route,
    RouteModule,
};

fn capture() -> (Cli, MemoryLogger) {
    let logger = MemoryLogger::new();
    let mut cli: Cli = Cli::new("lazy");
    cli.logger(Rc::new(logger.clone()));
    (cli, logger)
}

fn say(
    message: &'static str,
) -> impl for<'a> Fn(&'a mut CommandInput, &'a CommandOutput) -> waypath::StepFuture<'a> {
    from_fn(move |_: &mut CommandInput, output: &CommandOutput| {
        output.emit(message);
        Ok(())
    })
}

fn ecosystem() -> anyhow::Result<RouteModule> {
    let mut route: Route = Route::new();
    route.command("info", say("ecosystem info"))?;
    route.default_command(say("ecosystem default"));
    Ok(RouteModule::new(route))
}

#[test]
fn test_lazy_route_dispatches_into_resolved_tree() {
    let (mut cli, logger) = capture();
    cli.lazy_route("ecosystem", || async { ecosystem() }).unwrap();

    block_on(cli.dispatch(["ecosystem", "info"], ())).unwrap();

    assert_eq!(logger.lines(), vec!["ecosystem info"]);
}

#[test]
fn test_lazy_route_default_handles_unmatched_subpath() {
    let (mut cli, logger) = capture();
    cli.lazy_route("ecosystem", || async { ecosystem() }).unwrap();
    cli.default_command(say("root default"));

    let outcome = block_on(cli.dispatch(["ecosystem", "unknown"], ())).unwrap();

    assert_eq!(outcome, Outcome::Handled);
    assert_eq!(logger.lines(), vec!["ecosystem default"]);
}

#[test]
fn test_module_without_route_fails_dispatch() {
    let (mut cli, logger) = capture();
    cli.lazy_route("foo", || async { Ok::<_, anyhow::Error>(RouteModule::<()>::empty()) })
        .unwrap();
    cli.default_command(say("default"));

    let error = block_on(cli.dispatch(["foo", "bar"], ())).unwrap_err();

    assert!(matches!(error, DispatchError::MissingRoute { ref pattern } if pattern == "foo"));
    assert!(logger.lines().is_empty());
}

#[test]
fn test_resolver_error_fails_dispatch_without_trying_siblings() {
    let (mut cli, logger) = capture();
    cli.lazy_route("plugins", || async {
        Err::<RouteModule, _>(anyhow::anyhow!("plugin directory missing"))
    })
    .unwrap();
    cli.route("plugins")
        .unwrap()
        .default_command(say("eager sibling"));
    cli.default_command(say("default"));

    let error = block_on(cli.dispatch(["plugins", "list"], ())).unwrap_err();

    assert!(error.is_lazy_resolution());
    let source = std::error::Error::source(&error).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("plugin directory missing"));
    assert!(logger.lines().is_empty());
}

#[test]
fn test_resolver_runs_once_per_matching_dispatch() {
    let calls = Rc::new(Cell::new(0));
    let (mut cli, _) = capture();
    let counter = calls.clone();
    cli.lazy_route("ecosystem", move || {
        counter.set(counter.get() + 1);
        async { ecosystem() }
    })
    .unwrap();
    cli.command("hello", say("world")).unwrap();

    block_on(cli.dispatch(["hello"], ())).unwrap();
    assert_eq!(calls.get(), 0);

    block_on(cli.dispatch(["ecosystem", "info"], ())).unwrap();
    block_on(cli.dispatch(["ecosystem", "info"], ())).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_lazy_route_binds_params() {
    let (mut cli, logger) = capture();
    cli.lazy_route("pkg :name", || async {
        let mut route: Route = Route::new();
        route.command("version", from_fn(|input: &mut CommandInput, output: &CommandOutput| {
            output.emit(format!("{} 1.0.0", input.param("name").unwrap_or_default()));
            Ok(())
        }))?;
        Ok::<_, anyhow::Error>(RouteModule::new(route))
    })
    .unwrap();

    block_on(cli.dispatch(["pkg", "serde", "version"], ())).unwrap();

    assert_eq!(logger.lines(), vec!["serde 1.0.0"]);
}

#[test]
fn test_help_does_not_resolve_lazy_routes() {
    let calls = Rc::new(Cell::new(0));
    let (mut cli, _) = capture();
    let counter = calls.clone();
    cli.lazy_route("ecosystem", move || {
        counter.set(counter.get() + 1);
        async { ecosystem() }
    })
    .unwrap();

    assert!(cli.help().contains("  ecosystem\n"));
    assert_eq!(calls.get(), 0);
}
