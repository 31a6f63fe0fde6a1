use clap::Parser;
use rand::Rng;
use rand::seq::IndexedRandom;
use sekkei::model::{ActionKind, FieldKind, FieldPatch, FormModel, Operator, RuleDraft};
use std::fs;

/// A CLI tool to generate sample form models for the sekkei tools
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_form.json")]
    output: String,

    /// Number of fields to generate
    #[arg(long, default_value_t = 8)]
    fields: usize,

    /// Number of logic rules to generate between the fields
    #[arg(long, default_value_t = 2)]
    rules: usize,
}

const TITLES: &[&str] = &["请假申请", "报销单", "入职登记", "设备领用", "客户回访"];

const OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Neq,
    Operator::Contains,
    Operator::NotEmpty,
];

const ACTIONS: &[ActionKind] = &[
    ActionKind::Show,
    ActionKind::Hide,
    ActionKind::Required,
    ActionKind::ReadOnly,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.fields == 0 {
        eprintln!("Error: --fields must be at least 1");
        std::process::exit(1);
    }

    let mut model = FormModel::new();
    model.title = TITLES.choose(&mut rng).copied().unwrap_or("示例表单").to_string();
    model.basic_info.form_name = model.title.clone();

    let kinds: Vec<&FieldKind> = FieldKind::BUILTIN
        .iter()
        .filter(|k| !k.is_composite())
        .collect();
    let mut ids = Vec::with_capacity(cli.fields);
    for _ in 0..cli.fields {
        let Some(kind) = kinds.choose(&mut rng) else {
            break;
        };
        let id = model.add_field((*kind).clone());
        let patch = FieldPatch {
            required: Some(rng.random_bool(0.3)),
            width: Some(*[50u8, 100].choose(&mut rng).unwrap_or(&100)),
            ..FieldPatch::default()
        };
        model.update_field(&id, patch)?;
        ids.push(id);
    }
    println!("-> Generated {} field(s).", ids.len());

    let targets: Vec<String> = model.rule_fields().iter().map(|f| f.id.clone()).collect();
    let mut added = 0;
    if targets.len() >= 2 {
        for _ in 0..cli.rules {
            let condition = &targets[rng.random_range(0..targets.len())];
            let target = &targets[rng.random_range(0..targets.len())];
            if condition == target {
                continue;
            }
            let operator = *OPERATORS.choose(&mut rng).unwrap_or(&Operator::Eq);
            let action = *ACTIONS.choose(&mut rng).unwrap_or(&ActionKind::Show);
            let mut draft = RuleDraft::new(condition.clone(), operator, action, target.clone());
            if operator.takes_value() {
                draft = draft.with_condition_value(format!("值{}", rng.random_range(1..10)));
            }
            model.save_logic_rule(draft, None)?;
            added += 1;
        }
    }
    println!("-> Generated {} logic rule(s).", added);

    fs::write(&cli.output, model.to_json_pretty())?;
    println!(
        "Successfully generated and saved form model to '{}'",
        cli.output
    );

    Ok(())
}
