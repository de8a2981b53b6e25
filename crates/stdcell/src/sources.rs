// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pinned upstream source locations for each supported platform (§4.1).
//!
//! Every revision below is a literal commit/tag, not a moving branch —
//! bootstrap must be reproducible across machines and across time.

/// The primary source for asap7 (Platform A, the high-speed library):
/// raw files at a pinned revision of the flow repository.
pub const ASAP7_FLOW_REPO_RAW: &str =
    "https://raw.githubusercontent.com/The-OpenROAD-Project/OpenROAD-flow-scripts/\
     c4f81652a9737eb09fc9a52eae9d0ee68b3ea108/flow/platforms/asap7/verilog/stdcell";

/// Fallback source: a pinned revision of the library's own sim-model repo,
/// tried per-file when the flow repo doesn't have it.
pub const ASAP7_LIB_REPO_RAW: &str =
    "https://raw.githubusercontent.com/The-OpenROAD-Project/asap7sc7p5t/\
     3d1080fb4f2e8d6e32c8f6b44a1c2b1de4f43b6a/sim_models/verilog";

/// Fixed set of library sub-files that must all be present after bootstrap.
/// Each file may come from either `ASAP7_FLOW_REPO_RAW` or
/// `ASAP7_LIB_REPO_RAW`.
pub const ASAP7_REQUIRED_FILES: &[&str] = &[
    "asap7sc7p5t_SIMPLE_RVT_TT_201020.v",
    "asap7sc7p5t_AO_RVT_TT_201020.v",
    "asap7sc7p5t_OA_RVT_TT_201020.v",
    "asap7sc7p5t_INVBUF_RVT_TT_201020.v",
    "asap7sc7p5t_SEQ_RVT_TT_220123.v",
];

/// The sequential-library file that §4.1's compat profile may substitute
/// out for the bundled behavioral shims.
pub const ASAP7_SEQ_FILE: &str = "asap7sc7p5t_SEQ_RVT_TT_220123.v";

/// Files excluded from compile-time inclusion during `resolve` for asap7,
/// because they duplicate definitions already present in the sequential
/// library view.
pub const ASAP7_RESOLVE_EXCLUDE: &[&str] = &["dff.v", "empty.v"];

/// Pinned source tarball for sky130hd (Platform B, the open-PDK library).
pub const SKY130HD_TARBALL_URL: &str =
    "https://github.com/VLSI-EDA/sky130_osu_sc_t12/archive/\
     91b2252a5a78e3b5d4e1dfb5f5b4225c4c8c6e4f.tar.gz";

/// Module-name prefix shared by every sky130hd standard cell; used both to
/// recognize wrapper files during bootstrap and to filter the include list
/// during `resolve`.
pub const SKY130HD_MODULE_PREFIX: &str = "sky130_fd_sc_hd";
