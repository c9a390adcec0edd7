// Quick demonstration of the undo/redo history
// Run with: RUST_LOG=debug cargo run --bin demo_undo_history

use myform_designer::{DesignerConfig, DesignerContext, PropertyValue, SignalHandler};

fn print_history(ctx: &DesignerContext) {
    let Some(project) = ctx.active_project() else {
        return;
    };
    let history = project.history();
    println!("   Undo ({}):", history.undo_len());
    for description in history.undo_descriptions() {
        println!("     - {}", description);
    }
    println!("   Redo ({}):", history.redo_len());
    for description in history.redo_descriptions() {
        println!("     - {}", description);
    }
    println!("   Modified: {}", project.is_modified());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("🧩 MyForm Designer - Undo/Redo History Demo");
    println!("============================================");

    let config = DesignerConfig::load_or_default();
    println!(
        "⚙️  History depth: {}, coalescing: {}",
        config.history.max_depth, config.history.coalesce.enabled
    );

    let mut ctx = DesignerContext::new(config);
    ctx.new_project("Login form");

    // Build a small form
    let window = ctx.create("Window", None, None)?;
    let vbox = ctx.create("Box", Some(window), None)?;
    let entry = ctx.create("Entry", Some(vbox), None)?;
    let button = ctx.create("Button", Some(vbox), None)?;
    ctx.rename(button, "ok_button")?;
    ctx.set_property(window, "title", PropertyValue::from("Log in"))?;

    println!("\n✅ Built the form");
    print_history(&ctx);

    // Typing into the property editor collapses into one entry
    for label in ["O", "OK", "OK!"] {
        ctx.set_property(button, "label", PropertyValue::from(label))?;
    }
    if let Some(project) = ctx.active_project_mut() {
        project.mark_saved();
    }
    println!("\n⌨️  Typed a label and saved");
    print_history(&ctx);

    ctx.add_signal(button, SignalHandler::new("clicked", "on_ok_clicked"))?;
    ctx.move_widget(button, Some(vbox), Some(0))?;
    println!("\n🔌 Connected a handler and moved the button first");
    print_history(&ctx);

    // Undo back past the save point
    println!();
    while let Some(label) = ctx.undo_label() {
        println!("↩️  {}", label);
        ctx.undo()?;
    }
    print_history(&ctx);

    // Redo a few steps
    println!();
    for _ in 0..4 {
        let Some(label) = ctx.redo_label() else {
            break;
        };
        println!("↪️  {}", label);
        ctx.redo()?;
    }
    print_history(&ctx);

    // A new edit discards what is left to redo
    ctx.cut(entry)?;
    ctx.paste(Some(vbox), None)?;
    println!("\n✂️  Cut and pasted the entry");
    print_history(&ctx);

    if let Some(project) = ctx.active_project() {
        println!("\n📋 Final tree:");
        for widget in project.tree().iter() {
            println!(
                "   {} {} ({}), {} children",
                widget.id,
                widget.name,
                widget.class_name,
                widget.children().len()
            );
        }
    }

    println!("\n✅ Demo complete");
    Ok(())
}
