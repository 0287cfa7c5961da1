//! Animal/Dog/Cat walkthrough

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use colored::Colorize;
use metamorph_core::{Registry, RootBuilder, Signature, Value, VariantBuilder};

/// One step of the walkthrough and what came of it.
struct Step {
    action: &'static str,
    outcome: String,
    ok: bool,
}

impl Step {
    fn ok(action: &'static str, outcome: impl ToString) -> Self {
        Self {
            action,
            outcome: outcome.to_string(),
            ok: true,
        }
    }

    fn refused(action: &'static str, error: impl ToString) -> Self {
        Self {
            action,
            outcome: error.to_string(),
            ok: false,
        }
    }
}

pub fn execute(format: OutputFormat) -> CliResult<()> {
    let steps = walkthrough().map_err(|e| CliError::Demo(e.to_string()))?;

    match format {
        OutputFormat::Text => {
            println!("{}", "Metamorph walkthrough".bold().cyan());
            println!("{}", "=".repeat(60));
            for step in &steps {
                let mark = if step.ok { "✓".green() } else { "✗".red() };
                println!("  {} {}", mark, step.action.bold());
                println!("      {}", step.outcome.dimmed());
            }
        }
        OutputFormat::Json => {
            let json: Vec<_> = steps
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "action": s.action,
                        "outcome": s.outcome,
                        "ok": s.ok,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn walkthrough() -> anyhow::Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut reg = Registry::new();

    let animal = reg.define_root(
        RootBuilder::new("Animal")
            .initializer(Signature::new().typed_arg("name", "str"), |rx, args| {
                rx.set_private("name", args[0].clone());
                Ok(Value::Unit)
            })
            .method("speak", Signature::new().returns("str"), |_, _| {
                Ok("...".into())
            })
            .method("describe", Signature::new().returns("str"), |_, _| {
                Ok("an animal".into())
            }),
    )?;
    steps.push(Step::ok("define Animal", "registered as family root"));

    let dog = reg.define_variant(
        VariantBuilder::new("Dog", animal)
            .method("speak", Signature::new().returns("str"), |_, _| {
                Ok("Woof".into())
            })
            .method("describe", Signature::new().returns("str"), |rx, _| {
                let name = rx.private("name").cloned().unwrap_or_default();
                Ok(format!("a dog called {name}").into())
            }),
    )?;
    steps.push(Step::ok("define Dog", "speak() -> str matches Animal"));

    let cat = VariantBuilder::new("Cat", animal).method(
        "speak",
        Signature::new().arg("volume").returns("str"),
        |_, _| Ok("Meow".into()),
    );
    match reg.define_variant(cat) {
        Ok(_) => steps.push(Step::ok("define Cat", "registered")),
        Err(e) => steps.push(Step::refused("define Cat", e)),
    }

    let robot = reg.define_root(RootBuilder::new("Robot"))?;
    steps.push(Step::ok("define Robot", "registered as a separate family root"));

    let mut rex = reg.instantiate(animal, &["Rex".into()])?;
    steps.push(Step::ok("Animal(\"Rex\")", format!("instance {}", rex.id())));
    steps.push(Step::ok("speak()", reg.call(&mut rex, "speak", &[])?));

    reg.morph(&mut rex, dog)?;
    steps.push(Step::ok("morph to Dog", format!("instance {}", rex.id())));
    steps.push(Step::ok("speak()", reg.call(&mut rex, "speak", &[])?));
    steps.push(Step::ok("describe()", reg.call(&mut rex, "describe", &[])?));

    match reg.morph(&mut rex, robot) {
        Ok(()) => steps.push(Step::ok("morph to Robot", "morphed")),
        Err(e) => steps.push(Step::refused("morph to Robot", e)),
    }
    steps.push(Step::ok(
        "active class",
        reg.class_name(rex.active_class()),
    ));

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkthrough_rejects_cat_and_robot() {
        let steps = walkthrough().unwrap();
        let refused: Vec<_> = steps.iter().filter(|s| !s.ok).map(|s| s.action).collect();
        assert_eq!(refused, vec!["define Cat", "morph to Robot"]);
        assert!(steps.iter().any(|s| s.outcome == "Woof"));
        assert!(steps.iter().any(|s| s.outcome == "a dog called Rex"));
        assert_eq!(steps.last().unwrap().outcome, "Dog");
    }
}
