//! `food`: a small CLI built on waypath.
//!
//! ```text
//! food
//!     hello
//!     fruit
//!         banana
//!             peel
//!             eat [--whole | -w]
//!     other :item
//!         eat
//!     vegetables :item2
//!         *
//!     help
//!     *
//! ```
//!
//! Set `RUST_LOG=waypath=debug` to trace the dispatch on stderr.

use std::process::ExitCode;

use futures::executor::block_on;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypath::{from_fn, Cli, CommandInput, CommandOutput, OptionSpec, Outcome, ParamSpec};

fn eat(input: &mut CommandInput, output: &CommandOutput) -> anyhow::Result<()> {
    let item = input.param("item").unwrap_or("banana");
    let how = if input.flag("whole") { "whole" } else { "in pieces" };
    output.emit(format!("eating {item} {how}"));
    Ok(())
}

fn build_cli() -> anyhow::Result<Cli> {
    let mut food: Cli = Cli::new("food");
    food.describe("Things to do with food.");

    food.command(
        "hello",
        from_fn(|_: &mut CommandInput, output: &CommandOutput| {
            output.emit("world");
            Ok(())
        }),
    )?
    .describe("Say hello");

    let fruit = food.route("fruit")?;
    fruit.describe("Fruit, mostly bananas");
    let banana = fruit.route("banana")?;
    banana
        .command(
            "peel",
            from_fn(|_: &mut CommandInput, output: &CommandOutput| {
                output.emit("peeled!");
                Ok(())
            }),
        )?
        .describe("Peel the banana");
    banana
        .command("eat", from_fn(eat))?
        .option("whole", OptionSpec::new().alias("w").describe("Eat it in one go"))
        .describe("Eat the banana");

    food.route("other :item")?
        .command("eat", from_fn(eat))?
        .describe("Eat something else");

    food.param(
        "item2",
        ParamSpec::new().friendly_name("vegetable").regex("[a-z]+")?,
    );
    food.route("vegetables :item2")?
        .describe("Vegetables, by name")
        .default_command(from_fn(|input: &mut CommandInput, output: &CommandOutput| {
            output.emit(format!(
                "not sure what to do with {}",
                input.param("item2").unwrap_or_default()
            ));
            Ok(())
        }));

    let help = food.help();
    food.command(
        "help",
        from_fn(move |_: &mut CommandInput, output: &CommandOutput| {
            output.emit(&help);
            Ok(())
        }),
    )?;

    food.default_command(from_fn(|_: &mut CommandInput, output: &CommandOutput| {
        output.emit("default handler");
        Ok(())
    }));

    Ok(food)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match build_cli() {
        Ok(cli) => cli,
        Err(error) => {
            eprintln!("food: failed to set up commands: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    match block_on(cli.run()) {
        Ok(Outcome::Unhandled) => {
            eprintln!("food: unknown command");
            ExitCode::from(2)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("food: {error}");
            ExitCode::FAILURE
        }
    }
}
