use anyhow::Result;
use glint_core::Stage;

pub fn run() -> Result<()> {
    for line in stage_lines() {
        println!("{line}");
    }
    Ok(())
}

fn stage_lines() -> Vec<String> {
    Stage::ORDER
        .iter()
        .enumerate()
        .map(|(i, stage)| format!("{:>2}  {:<22} {}", i + 1, stage.name(), stage.shader_entry()))
        .collect()
}
