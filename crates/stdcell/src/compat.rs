// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral compatibility models shipped with the system (§4.1
//! `compat_models`), used in place of the vendor sequential library for
//! gate-level simulation correctness workarounds: the vendor's
//! `asap7sc7p5t_SEQ_*.v` file carries SDF-oriented timing checks that many
//! open simulators choke on, so the `compat` sim profile substitutes these
//! pure-behavioral equivalents for the handful of sequential cells that
//! actually appear in synthesized netlists.

/// One compatibility model: a module name plus the module's own Verilog
/// source, so callers can match it against a netlist's cell references
/// before deciding to substitute it in.
#[derive(Debug, Clone, Copy)]
pub struct CompatModel {
    pub module_name: &'static str,
    pub filename: &'static str,
    pub source: &'static str,
}

const DFFHQNX1: &str = r#"module DFFHQNx1_ASAP7_75t_R (CLK, D, QN);
  input CLK, D;
  output QN;
  reg q_state;
  always @(posedge CLK) q_state <= D;
  assign QN = ~q_state;
endmodule
"#;

const DFFASRHQNX1: &str = r#"module DFFASRHQNx1_ASAP7_75t_R (CLK, D, RESET_B, SET_B, QN);
  input CLK, D, RESET_B, SET_B;
  output QN;
  reg q_state;
  always @(posedge CLK or negedge RESET_B or negedge SET_B) begin
    if (!RESET_B) q_state <= 1'b0;
    else if (!SET_B) q_state <= 1'b1;
    else q_state <= D;
  end
  assign QN = ~q_state;
endmodule
"#;

const ICGX1: &str = r#"module ICGx1_ASAP7_75t_R (CLK, EN, GCLK);
  input CLK, EN;
  output GCLK;
  reg en_latched;
  always @(CLK or EN) if (!CLK) en_latched = EN;
  assign GCLK = CLK & en_latched;
endmodule
"#;

pub const COMPAT_MODELS: &[CompatModel] = &[
    CompatModel {
        module_name: "DFFHQNx1_ASAP7_75t_R",
        filename: "dffhqnx1_compat.v",
        source: DFFHQNX1,
    },
    CompatModel {
        module_name: "DFFASRHQNx1_ASAP7_75t_R",
        filename: "dffasrhqnx1_compat.v",
        source: DFFASRHQNX1,
    },
    CompatModel {
        module_name: "ICGx1_ASAP7_75t_R",
        filename: "icgx1_compat.v",
        source: ICGX1,
    },
];

/// Returns the compatibility models shipped for `platform`. Only asap7 has
/// any today; sky130hd's open-source wrapper/model files simulate cleanly
/// as-is.
pub fn compat_models(platform: rtlforge_core::Platform) -> &'static [CompatModel] {
    match platform {
        rtlforge_core::Platform::Asap7 => COMPAT_MODELS,
        rtlforge_core::Platform::Sky130Hd => &[],
    }
}
