// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation Pipeline command (§4.3): `simulate` runs an RTL or
//! post-synthesis testbench and always returns a self-describing
//! [`rtlforge_sim::SimResult`], never a bare tool failure.

use anyhow::Result;
use clap::Args;
use rtlforge_core::{Platform, Workspace};
use rtlforge_sim::SimRequest;

use crate::args::{normalize_file_list, parse_platform, parse_sim_mode, parse_sim_profile};
use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, value_parser = parse_sim_mode, default_value = "rtl")]
    pub mode: rtlforge_core::SimMode,
    /// Source files for `rtl` mode: a bare path, or a JSON array of paths.
    #[arg(long, default_value = "")]
    pub source_files: String,
    #[arg(long)]
    pub top_module: String,
    /// post_synth only: resolves `netlist_file`/`platform` from `run_meta.json` if unset.
    #[arg(long)]
    pub run_id: Option<String>,
    #[arg(long)]
    pub netlist_file: Option<String>,
    #[arg(long, value_parser = parse_platform)]
    pub platform: Option<Platform>,
    #[arg(long, value_parser = parse_sim_profile, default_value = "auto")]
    pub sim_profile: rtlforge_core::SimProfile,
    #[arg(long)]
    pub pass_marker: Option<String>,
}

pub async fn simulate(workspace: &Workspace, args: SimulateArgs, output: OutputFormat) -> Result<()> {
    let mut req = match args.mode {
        rtlforge_core::SimMode::Rtl => {
            let files = normalize_file_list(&args.source_files)
                .into_iter()
                .map(std::path::PathBuf::from)
                .collect();
            SimRequest::rtl(files, args.top_module)
        }
        rtlforge_core::SimMode::PostSynth => {
            let run_id = args
                .run_id
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--run-id is required for post_synth mode"))?;
            SimRequest::post_synth(args.top_module, run_id)
        }
    };
    req.sim_profile = args.sim_profile;
    req.netlist_file = args.netlist_file.map(std::path::PathBuf::from);
    req.platform = args.platform;
    if let Some(marker) = args.pass_marker {
        req.pass_marker = marker;
    }

    let result = rtlforge_sim::simulate(workspace, req).await?;
    match output {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            println!("{:?} (compile rc={})", result.status, result.compile_returncode);
            if !result.unresolved_cells.is_empty() {
                println!("unresolved cells: {}", result.unresolved_cells.join(", "));
            }
            if !result.stdout_tail.is_empty() {
                println!("--- stdout tail ---\n{}", result.stdout_tail);
            }
            Ok(())
        }
    }
}
