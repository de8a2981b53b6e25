// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standard-Cell Cache Manager commands (§4.1): `bootstrap-stdcell` fetches
//! and pins the simulation models for a platform; `resolve-stdcell` lists
//! the already-bootstrapped cache's files under the platform's selection
//! policy.

use anyhow::Result;
use clap::Args;
use rtlforge_core::{Platform, Workspace};
use serde_json::json;

use crate::args::parse_platform;
use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct PlatformArgs {
    #[arg(long, value_parser = parse_platform)]
    pub platform: Platform,
}

pub fn bootstrap(workspace: &Workspace, args: PlatformArgs, output: OutputFormat) -> Result<()> {
    let result = rtlforge_stdcell::bootstrap(workspace, args.platform)?;
    match output {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            println!(
                "bootstrapped {} ({} files) -> {}",
                result.platform,
                result.file_count,
                result.cache_dir.display()
            );
            Ok(())
        }
    }
}

pub fn resolve(workspace: &Workspace, args: PlatformArgs, output: OutputFormat) -> Result<()> {
    let (files, manifest) = rtlforge_stdcell::resolve(workspace, args.platform)?;
    let body = json!({
        "files": files.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        "manifest": manifest,
    });
    match output {
        OutputFormat::Json => print_json(&body),
        OutputFormat::Text => {
            println!("{} files resolved for {}", files.len(), manifest.platform);
            for f in &files {
                println!("  {}", f.display());
            }
            Ok(())
        }
    }
}
