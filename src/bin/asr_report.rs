use anyhow::{anyhow, Result};
use asr_report::analysis::ReportAnalysis;
use asr_report::metadata::Metadata;
use asr_report::report::Action;
use asr_report::serialize_dag::IndentPart;
use itertools::Itertools;
use serde::Serialize;
use std::env;

fn usage() {
    eprintln!(
        "Usage:\n  \
  asr_report summary REPORT.json [METADATA.json]\n  \
  asr_report order REPORT.json\n  \
  asr_report tree REPORT.json NODE_ID [--dependants]\n  \
  asr_report plan REPORT.json [--target N] [--position N]\n  \
  asr_report changes REPORT.json POSITION\n  \
  asr_report logo REPORT.json"
    );
}

#[derive(Serialize)]
struct ReportSummary {
    node_count: usize,
    leaf_count: usize,
    sequence_count: usize,
    instruction_count: usize,
    alignment_length: usize,
    topological_order: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn indent_glyphs(indent: &[IndentPart]) -> String {
    indent
        .iter()
        .map(|part| match part {
            IndentPart::Gap => "   ",
            IndentPart::Line => "\u{2502}  ",
            IndentPart::Join => "\u{251c}\u{2500} ",
        })
        .collect()
}

fn action_label(action: &Action, metadata: Option<&Metadata>, analysis: &ReportAnalysis) -> String {
    match action {
        Action::Combine => "combine".to_string(),
        Action::Sequence(index) => format!("sequence #{index}"),
        Action::Node(node_id) => {
            let label = analysis
                .report()
                .node(node_id)
                .ok()
                .and_then(|node| node.sequence_id.as_deref())
                .and_then(|sequence_id| metadata.and_then(|m| m.label_for(sequence_id)));
            match label {
                Some(label) => format!("{node_id} ({label})"),
                None => node_id.clone(),
            }
        }
    }
}

fn parse_flag(args: &[String], flag: &str) -> Result<Option<usize>> {
    match args.iter().position(|arg| arg == flag) {
        None => Ok(None),
        Some(at) => {
            let value = args
                .get(at + 1)
                .ok_or_else(|| anyhow!("{flag} needs a value"))?;
            Ok(Some(value.parse()?))
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (command, report_path) = match (args.first(), args.get(1)) {
        (Some(command), Some(path)) => (command.as_str(), path.as_str()),
        _ => {
            usage();
            return Err(anyhow!("missing command or report path"));
        }
    };
    let analysis = ReportAnalysis::from_json_file(report_path)?;

    match command {
        "summary" => {
            let metadata = match args.get(2) {
                Some(path) => Some(Metadata::from_json_file(path)?),
                None => None,
            };
            let report = analysis.report();
            print_json(&ReportSummary {
                node_count: report.nodes.len(),
                leaf_count: report.leaf_ids().len(),
                sequence_count: report.sequences.len(),
                instruction_count: report.plan.instructions.len(),
                alignment_length: report.alignment_length(),
                topological_order: analysis.topological_order()?,
            })?;
            if let Some(metadata) = metadata {
                for leaf in report.leaf_ids() {
                    println!(
                        "{leaf}: {}",
                        action_label(
                            &Action::Node(leaf.to_string()),
                            Some(&metadata),
                            &analysis
                        )
                    );
                }
            }
        }
        "order" => {
            println!("{}", analysis.topological_order()?.iter().join("\n"));
        }
        "tree" => {
            let node_id = args
                .get(2)
                .ok_or_else(|| anyhow!("tree needs a node id"))?;
            let entries = if args.iter().any(|arg| arg == "--dependants") {
                analysis.serialize_dependants(node_id)?
            } else {
                analysis.serialize_dependencies(node_id)?
            };
            for entry in entries {
                println!(
                    "{}{}",
                    indent_glyphs(&entry.indent),
                    action_label(&entry.action, None, &analysis)
                );
            }
        }
        "plan" => {
            let target = parse_flag(&args, "--target")?;
            let position = parse_flag(&args, "--position")?;
            let root = analysis.report().plan.target;
            for entry in analysis.serialize_plan(root, target, position)? {
                let alternates = if entry.alternates.is_empty() {
                    String::new()
                } else {
                    format!("  [alternates: {}]", entry.alternates.iter().join(", "))
                };
                println!(
                    "{}{}{alternates}",
                    indent_glyphs(&entry.indent),
                    action_label(&entry.action, None, &analysis)
                );
            }
        }
        "changes" => {
            let position: usize = args
                .get(2)
                .ok_or_else(|| anyhow!("changes needs a position"))?
                .parse()?;
            for change in analysis.find_changes_for_position(position)? {
                println!(
                    "{} {} -> {}",
                    action_label(&change.action, None, &analysis),
                    change.parent_amino_acid,
                    change.amino_acid
                );
            }
        }
        "logo" => {
            for (position, logo) in analysis.sequence_positions().iter().enumerate() {
                let counts = logo
                    .logo
                    .iter()
                    .map(|entry| format!("{}:{}", entry.amino_acid, entry.count))
                    .join(" ");
                println!("{position}\t{counts}");
            }
        }
        other => {
            usage();
            return Err(anyhow!("unknown command '{other}'"));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
