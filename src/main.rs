use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use huffvizd::config::{ServerConfig, DEFAULT_CONFIG_FILE};
use huffvizd::engine::{self, BitString, CodecError, HuffmanNode, PackedArtifact, WireNode};
use huffvizd::server;
use huffvizd::walkthrough::{Step, Walkthrough};

#[derive(Parser)]
#[command(name = "huffvizd")]
#[command(about = "Huffman coding walkthrough engine and server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, help = "Config file path")]
    config: Option<String>,

    #[arg(long, help = "Listen address (overrides config)")]
    listen: Option<String>,

    #[arg(long, help = "Keep input case instead of folding to upper case")]
    keep_case: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the request/response server (default)
    Serve,
    /// Count symbol frequencies
    Frequency { text: String },
    /// Build the tree and show each symbol's code
    Tree { text: String },
    /// Encode text, optionally writing a packed artifact
    Encode {
        text: String,
        #[arg(long, help = "Write the packed artifact to this path")]
        packed: Option<String>,
    },
    /// Decode a bit string with a tree exported as JSON
    Decode {
        #[arg(long, help = "Tree JSON file, bare or as printed by `tree --json`")]
        tree: String,
        bits: String,
    },
    /// Decode a packed artifact
    Unpack { path: String },
    /// Walk through every stage
    Walk { text: String },
    /// Encode, decode, and compare digests
    Verify { text: String },
    GenerateConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE, help = "Config file path")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huffvizd=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen_address = listen;
    }
    if cli.keep_case {
        config.engine.uppercase_input = false;
    }

    let json = cli.json;

    match cli.command {
        None | Some(Commands::Serve) => {
            info!("Starting huffvizd on {}", config.listen_address);
            server::run(&config).await
        }
        Some(Commands::Frequency { text }) => {
            let mut walk = walkthrough(&config, &text, json)?;
            advance_to(&mut walk, Step::Frequencies, json)?;
            let Some(table) = walk.frequencies() else {
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(table)?);
            } else {
                println!("📊 Symbol Frequencies");
                println!("====================");
                println!("   Input: {:?}", walk.text());
                for entry in table.iter() {
                    println!("   {:?}: {}", entry.symbol, entry.count);
                }
                println!("   Distinct symbols: {}", table.len());
                println!("   Total symbols: {}", table.total());
            }
            Ok(())
        }
        Some(Commands::Tree { text }) => {
            let mut walk = walkthrough(&config, &text, json)?;
            advance_to(&mut walk, Step::Tree, json)?;
            let (Some(tree), Some(codes)) = (walk.tree(), walk.codes()) else {
                return Ok(());
            };
            if json {
                println!("{}", serde_json::json!({
                    "tree": WireNode::from_tree(tree),
                    "codes": codes,
                }));
            } else {
                println!("🌳 Huffman Tree");
                println!("==============");
                print_tree(tree, "", "");
                println!();
                println!("   Leaves: {}, internal nodes: {}, depth: {}",
                         tree.leaf_count(), tree.internal_count(), tree.depth());
                for (symbol, code) in codes.iter() {
                    println!("   {:?} -> {}", symbol, code);
                }
            }
            Ok(())
        }
        Some(Commands::Encode { text, packed }) => {
            let mut walk = walkthrough(&config, &text, json)?;
            advance_to(&mut walk, Step::Encoded, json)?;
            let (Some(frequencies), Some(encoded)) = (walk.frequencies(), walk.encoded()) else {
                return Ok(());
            };

            if let Some(path) = &packed {
                let bytes = PackedArtifact::new(frequencies, encoded)
                    .to_bytes()
                    .map_err(|e| report(json, "Packing failed", e))?;
                std::fs::write(path, &bytes)?;
                info!("Wrote {} bytes to {}", bytes.len(), path);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(encoded)?);
            } else {
                println!("🔐 Encoded Text");
                println!("==============");
                println!("   Bits: {}", encoded.bits);
                println!("   Original size: {} bits", encoded.original_size_bits);
                println!("   Compressed size: {} bits", encoded.compressed_size_bits);
                match encoded.compression_ratio {
                    Some(ratio) => println!("   Compression ratio: {:.2}%", ratio),
                    None => println!("   Compression ratio: n/a"),
                }
                if let Some(path) = packed {
                    println!("   Packed artifact: {}", path);
                }
            }
            Ok(())
        }
        Some(Commands::Decode { tree, bits }) => {
            let text = decode_with(&std::fs::read(&tree)?, &bits).map_err(|e| report(json, "Decoding failed", e))?;
            if json {
                println!("{}", serde_json::json!({ "text": text }));
            } else {
                println!("🔓 Decoded Text");
                println!("==============");
                println!("   {}", text);
            }
            Ok(())
        }
        Some(Commands::Unpack { path }) => {
            let data = std::fs::read(&path)?;
            let text = engine::decompress(&data).map_err(|e| report(json, "Unpacking failed", e))?;
            if json {
                println!("{}", serde_json::json!({ "text": text }));
            } else {
                println!("📦 Unpacked Artifact");
                println!("===================");
                println!("   {}", text);
            }
            Ok(())
        }
        Some(Commands::Walk { text }) => {
            let mut walk = walkthrough(&config, &text, json)?;
            if !json {
                println!("🚶 Huffman Walkthrough");
                println!("=====================");
                println!("   Step 0 - input: {:?}", walk.text());
            }
            while walk.step() != Step::Encoded {
                let step = walk.advance().map_err(|e| report(json, "Walkthrough stopped", e))?;
                if !json {
                    print_step(&walk, step);
                }
            }
            if json {
                println!("{}", serde_json::json!({
                    "text": walk.text(),
                    "frequencies": walk.frequencies(),
                    "tree": walk.tree().map(WireNode::from_tree),
                    "codes": walk.codes(),
                    "encoded": walk.encoded(),
                }));
            }
            Ok(())
        }
        Some(Commands::Verify { text }) => {
            let mut walk = walkthrough(&config, &text, json)?;
            advance_to(&mut walk, Step::Encoded, json)?;
            let result = walk.verify().map_err(|e| report(json, "Verification failed", e))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("🔍 Round-trip Verification");
                println!("=========================");
                println!("   Original digest: {}", result.original_digest);
                println!("   Decoded digest:  {}", result.decoded_digest);
                println!("   {}", if result.matches { "✅ Round trip PASSED" } else { "❌ Round trip FAILED" });
            }
            if !result.matches {
                return Err(anyhow::anyhow!("round trip mismatch"));
            }
            Ok(())
        }
        Some(Commands::GenerateConfig { output }) => {
            ServerConfig::default().save(&output)?;
            if json {
                println!("{}", serde_json::json!({
                    "success": true,
                    "config_file": output,
                }));
            } else {
                println!("⚙️  Generate Configuration");
                println!("========================");
                println!("✅ Default configuration saved to: {}", output);
            }
            Ok(())
        }
    }
}

fn walkthrough(config: &ServerConfig, text: &str, json: bool) -> anyhow::Result<Walkthrough> {
    Walkthrough::new(text, config.engine.clone()).map_err(|e| report(json, "Invalid input", e))
}

fn advance_to(walk: &mut Walkthrough, target: Step, json: bool) -> anyhow::Result<()> {
    while walk.step() < target {
        walk.advance().map_err(|e| report(json, "Stage failed", e))?;
    }
    Ok(())
}

/// `tree_json` may be a bare tree or the output of `tree --json`.
fn decode_with(tree_json: &[u8], bits: &str) -> Result<String, CodecError> {
    let bits: BitString = bits.parse()?;
    let tree = WireNode::from_json(tree_json)?.into_tree()?;
    engine::decode(&tree, &bits)
}

/// Print a codec failure the way the output mode expects and hand it back.
fn report(json: bool, title: &str, err: CodecError) -> anyhow::Error {
    if json {
        println!("{}", serde_json::json!({ "error": err.kind(), "message": err.to_string() }));
    } else {
        eprintln!("❌ {}: {}", title, err);
    }
    err.into()
}

fn print_step(walk: &Walkthrough, step: Step) {
    match step {
        Step::Input => {}
        Step::Frequencies => {
            if let Some(table) = walk.frequencies() {
                let counts: Vec<String> = table
                    .iter()
                    .map(|e| format!("{:?}:{}", e.symbol, e.count))
                    .collect();
                println!("   Step 1 - frequencies: {}", counts.join(" "));
            }
        }
        Step::Tree => {
            if let Some(tree) = walk.tree() {
                println!("   Step 2 - tree ({} nodes):", tree.node_count());
                print_tree(tree, "     ", "");
            }
        }
        Step::Encoded => {
            if let Some(encoded) = walk.encoded() {
                println!("   Step 3 - encoded: {}", encoded.bits);
                println!("            {} -> {} bits", encoded.original_size_bits, encoded.compressed_size_bits);
            }
        }
    }
}

fn print_tree(node: &HuffmanNode, indent: &str, code: &str) {
    match node {
        HuffmanNode::Leaf { symbol, frequency } => {
            let code = if code.is_empty() { "0" } else { code };
            println!("{}{:?} ({}) [{}]", indent, symbol, frequency, code);
        }
        HuffmanNode::Internal { label, frequency, left, right } => {
            println!("{}{:?} ({})", indent, label, frequency);
            let child_indent = format!("{}  ", indent);
            print_tree(left, &child_indent, &format!("{}0", code));
            print_tree(right, &child_indent, &format!("{}1", code));
        }
    }
}
