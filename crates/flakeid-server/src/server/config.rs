use anyhow::bail;
use clap::{Parser, ValueEnum};
use flakeid::{BitLayout, NodeIdentity, PrefixPolicy};
use std::time::Duration;

/// Bit layouts selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChoice {
    /// 5 datacenter bits, 5 worker bits, 12 sequence bits.
    Classic,
    /// 6 datacenter bits, 4 worker bits, 12 sequence bits.
    WideDatacenter,
}

impl From<LayoutChoice> for BitLayout {
    fn from(choice: LayoutChoice) -> Self {
        match choice {
            LayoutChoice::Classic => Self::CLASSIC,
            LayoutChoice::WideDatacenter => Self::WIDE_DATACENTER,
        }
    }
}

/// Runtime configuration for the `flakeid-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first when present). Node identity is validated before the
/// server binds, so a misconfigured node never hands out an ID.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid-server",
    version,
    about = "An HTTP service for Snowflake IDs and business serial numbers"
)]
pub struct CliArgs {
    /// Worker ID of this node. Must fit the layout's worker field.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Datacenter ID of this node. Must fit the layout's datacenter field.
    ///
    /// Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub datacenter_id: i64,

    /// Bit layout of fixed-layout IDs. Changing it on a running fleet breaks
    /// the comparability of IDs issued before and after.
    ///
    /// Environment variable: `ID_LAYOUT`
    #[arg(long, env = "ID_LAYOUT", value_enum, default_value_t = LayoutChoice::Classic)]
    pub layout: LayoutChoice,

    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:3000"))]
    pub server_addr: String,

    /// How long `POST /bench` keeps generating before it reports.
    ///
    /// Environment variable: `BENCH_WINDOW_MS`
    #[arg(long, env = "BENCH_WINDOW_MS", default_value_t = 1_000)]
    pub bench_window_ms: u64,

    /// Put the historical kind prefix (order `1`, trade `9`, refund `8`) in
    /// front of business numbers.
    ///
    /// Environment variable: `APPLY_BUSINESS_PREFIXES`
    #[arg(long, env = "APPLY_BUSINESS_PREFIXES", default_value_t = false)]
    pub apply_business_prefixes: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub layout: BitLayout,
    pub node: NodeIdentity,
    pub server_addr: String,
    pub bench_window: Duration,
    pub prefixes: PrefixPolicy,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let layout = BitLayout::from(args.layout);
        let node = NodeIdentity::new(&layout, args.worker_id, args.datacenter_id)?;

        if args.bench_window_ms == 0 {
            bail!("BENCH_WINDOW_MS must be greater than 0");
        }

        let prefixes = if args.apply_business_prefixes {
            PrefixPolicy::Apply
        } else {
            PrefixPolicy::Omit
        };

        Ok(Self {
            layout,
            node,
            server_addr: args.server_addr,
            bench_window: Duration::from_millis(args.bench_window_ms),
            prefixes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("flakeid-server").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::try_from(parse(&[])).unwrap();
        assert_eq!(config.layout, BitLayout::CLASSIC);
        assert_eq!(config.node.worker_id(), 0);
        assert_eq!(config.prefixes, PrefixPolicy::Omit);
        assert_eq!(config.bench_window, Duration::from_millis(1_000));
    }

    #[test]
    fn node_identity_is_checked_against_selected_layout() {
        let args = parse(&["--layout", "wide-datacenter", "--datacenter-id", "63"]);
        let config = ServerConfig::try_from(args).unwrap();
        assert_eq!(config.node.datacenter_id(), 63);

        let args = parse(&["--datacenter-id", "63"]);
        assert!(ServerConfig::try_from(args).is_err());

        let args = parse(&["--worker-id", "-1"]);
        assert!(ServerConfig::try_from(args).is_err());
    }

    #[test]
    fn zero_bench_window_is_rejected() {
        let args = parse(&["--bench-window-ms", "0"]);
        assert!(ServerConfig::try_from(args).is_err());
    }

    #[test]
    fn prefixes_flag_switches_policy() {
        let args = parse(&["--apply-business-prefixes"]);
        let config = ServerConfig::try_from(args).unwrap();
        assert_eq!(config.prefixes, PrefixPolicy::Apply);
    }
}
