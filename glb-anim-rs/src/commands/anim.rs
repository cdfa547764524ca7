//! Animation command implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;
use glb_anim::{
    AnimationParser, AnimationPlayer, AnimationSet, ByteSource, Container, LoopType,
    ManualScheduler, NodeTransform, ParseWarning, PlayerSettings, Source, TickScheduler,
};
use serde_json::json;

use crate::utils::{
    add_table_row, create_frame_bar, create_table, format_bytes, format_loop_type,
    format_play_state, format_quat, format_seconds, format_vec3,
};

/// Where to read the container from and how strictly to parse it
#[derive(Args)]
pub struct InputArgs {
    /// Path to the GLB file (or an http(s) URL when built with `http`)
    pub file: String,

    /// Fail on the first parse warning instead of skipping the channel
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum AnimCommands {
    /// List the animations and nodes in a GLB file
    Info {
        #[command(flatten)]
        input: InputArgs,

        /// Also print the rest pose of every node
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print node transforms at a point in an animation
    Sample {
        #[command(flatten)]
        input: InputArgs,

        /// Animation name (defaults to the first one)
        #[arg(short, long)]
        animation: Option<String>,

        /// Time in seconds
        #[arg(short, long, conflicts_with = "percent", allow_negative_numbers = true)]
        time: Option<f32>,

        /// Position as a fraction of the duration (0.0 - 1.0)
        #[arg(short, long)]
        percent: Option<f32>,

        /// Wrap times outside the animation instead of clamping
        #[arg(long = "loop")]
        looping: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Play an animation in real time and print the final pose
    Play {
        #[command(flatten)]
        input: InputArgs,

        /// Animation name (defaults to the first one)
        #[arg(short, long)]
        animation: Option<String>,

        /// Ticks per second
        #[arg(long, default_value = "30")]
        fps: f32,

        /// Playback speed multiplier (negative plays backwards)
        #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
        speed: f32,

        /// Wrap around at the ends instead of clamping
        #[arg(long = "loop")]
        looping: bool,

        /// Wall-clock seconds to play for
        #[arg(long, default_value = "1.0")]
        seconds: f32,
    },
}

pub async fn execute(command: AnimCommands, quiet: bool) -> Result<()> {
    match command {
        AnimCommands::Info { input, detailed } => execute_info(input, detailed).await,
        AnimCommands::Sample {
            input,
            animation,
            time,
            percent,
            looping,
            json,
        } => execute_sample(input, animation, time, percent, looping, json).await,
        AnimCommands::Play {
            input,
            animation,
            fps,
            speed,
            looping,
            seconds,
        } => execute_play(input, animation, fps, speed, looping, seconds, quiet).await,
    }
}

/// Read and parse the container, keeping the raw bytes for header details
async fn load(input: &InputArgs) -> Result<(Vec<u8>, AnimationSet, Vec<ParseWarning>)> {
    let source = Source::from_location(&input.file)
        .with_context(|| format!("Unsupported location: {}", input.file))?;
    let bytes = source
        .read_bytes()
        .await
        .with_context(|| format!("Failed to read {}", input.file))?;
    let parser = AnimationParser::new().with_strict(input.strict);
    let (set, warnings) = parser
        .parse_with_warnings(&bytes)
        .with_context(|| format!("Failed to parse {}", input.file))?;
    Ok((bytes, set, warnings))
}

fn loop_type(looping: bool) -> LoopType {
    if looping { LoopType::Loop } else { LoopType::Clamp }
}

/// Current output sorted by node name
fn sorted_pose<S: TickScheduler>(player: &AnimationPlayer<S>) -> Vec<(&String, &NodeTransform)> {
    let mut nodes: Vec<_> = player.transforms().iter().collect();
    nodes.sort_by(|a, b| a.0.cmp(b.0));
    nodes
}

fn print_pose(nodes: &[(&String, &NodeTransform)]) {
    let mut table = create_table(vec!["Node", "Translation", "Rotation", "Scale"]);
    for (name, transform) in nodes {
        add_table_row(
            &mut table,
            vec![
                (*name).clone(),
                format_vec3(transform.translation),
                format_quat(transform.rotation),
                format_vec3(transform.scale),
            ],
        );
    }
    table.printstd();
}

fn select_animation<S: TickScheduler>(
    player: &mut AnimationPlayer<S>,
    animation: Option<&str>,
) -> Result<()> {
    if let Some(name) = animation {
        player
            .set_animation(name)
            .with_context(|| format!("Unknown animation '{name}'"))?;
    }
    Ok(())
}

async fn execute_info(input: InputArgs, detailed: bool) -> Result<()> {
    let (bytes, set, warnings) = load(&input).await?;
    let container = Container::parse(&bytes).context("Failed to re-read container header")?;

    println!("\n{}", style("GLB Animation Information").bold().underlined());
    println!("File: {}", style(&input.file).cyan());
    println!("Size: {}", style(format_bytes(bytes.len() as u64)).yellow());
    println!(
        "Container version: {}",
        style(container.header.version).yellow()
    );
    println!(
        "Binary chunk: {}",
        style(format_bytes(container.blob().len() as u64)).yellow()
    );
    println!("Nodes: {}", style(set.nodes().len()).green());
    println!("Animations: {}", style(set.animations().len()).green());

    if !set.animations().is_empty() {
        println!("\n{}", style("Animations").bold());
        let mut table = create_table(vec!["Name", "Duration", "Tracks", "Keys"]);
        for animation in set.animations() {
            let keys: usize = animation.tracks().iter().map(|t| t.key_count()).sum();
            add_table_row(
                &mut table,
                vec![
                    animation.name().to_string(),
                    format_seconds(animation.duration()),
                    animation.tracks().len().to_string(),
                    keys.to_string(),
                ],
            );
        }
        table.printstd();
    }

    if detailed && !set.nodes().is_empty() {
        println!("\n{}", style("Rest Pose").bold());
        let mut table = create_table(vec!["Node", "Translation", "Rotation", "Scale"]);
        for node in set.nodes() {
            add_table_row(
                &mut table,
                vec![
                    node.name.clone(),
                    format_vec3(node.translation),
                    format_quat(node.rotation),
                    format_vec3(node.scale),
                ],
            );
        }
        table.printstd();
    }

    if !warnings.is_empty() {
        println!(
            "\n{} ({})",
            style("Warnings").bold().yellow(),
            warnings.len()
        );
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}

async fn execute_sample(
    input: InputArgs,
    animation: Option<String>,
    time: Option<f32>,
    percent: Option<f32>,
    looping: bool,
    json: bool,
) -> Result<()> {
    let (_, set, _) = load(&input).await?;
    let settings = PlayerSettings::default().with_loop_type(loop_type(looping));
    let mut player =
        AnimationPlayer::with_settings(Arc::new(set), ManualScheduler::new(), settings)
            .context("Cannot play this file")?;
    select_animation(&mut player, animation.as_deref())?;

    match (time, percent) {
        (_, Some(percent)) => player.set_percent(percent),
        (Some(time), None) => player.set_time(time),
        (None, None) => player.set_time(0.0),
    }

    let nodes = sorted_pose(&player);

    if json {
        let transforms: serde_json::Map<String, serde_json::Value> = nodes
            .iter()
            .map(|(name, t)| {
                (
                    (*name).clone(),
                    json!({
                        "translation": t.translation.to_array(),
                        "rotation": t.rotation.to_array(),
                        "scale": t.scale.to_array(),
                    }),
                )
            })
            .collect();
        let output = json!({
            "animation": player.current_animation().name(),
            "duration": player.current_animation().duration(),
            "time": player.current_time(),
            "loop": format_loop_type(player.loop_type()),
            "transforms": transforms,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Animation {} at {} of {} ({})",
        style(player.current_animation().name()).cyan(),
        style(format_seconds(player.current_time())).yellow(),
        format_seconds(player.current_animation().duration()),
        format_loop_type(player.loop_type())
    );
    print_pose(&nodes);

    Ok(())
}

async fn execute_play(
    input: InputArgs,
    animation: Option<String>,
    fps: f32,
    speed: f32,
    looping: bool,
    seconds: f32,
    quiet: bool,
) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        anyhow::bail!("--seconds must be a non-negative number, got {seconds}");
    }

    let (_, set, _) = load(&input).await?;
    let settings = PlayerSettings::default()
        .with_fps(fps)
        .with_speed(speed)
        .with_loop_type(loop_type(looping));
    let mut player =
        AnimationPlayer::with_settings(Arc::new(set), ManualScheduler::new(), settings)
            .context("Cannot play this file")?;
    select_animation(&mut player, animation.as_deref())?;

    player.play();
    let handle = player
        .tick_handle()
        .context("Playback did not schedule a tick")?;
    let period = player
        .scheduler()
        .period(handle)
        .context("Tick is not scheduled")?;

    let frames = (seconds / period.as_secs_f32()).ceil() as u64;
    let bar = create_frame_bar(frames, player.current_animation().name(), quiet);

    let mut interval = tokio::time::interval(period);
    // The first tick of a tokio interval completes immediately
    interval.tick().await;
    for _ in 0..frames {
        interval.tick().await;
        player.tick();
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "Played {} for {} frames: {} at {} ({})",
        style(player.current_animation().name()).cyan(),
        style(frames).green(),
        format_play_state(player.play_state()),
        style(format_seconds(player.current_time())).yellow(),
        format_loop_type(player.loop_type())
    );

    print_pose(&sorted_pose(&player));

    player.stop();
    Ok(())
}
