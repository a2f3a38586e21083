mod assets;
mod builtin;
mod cli;
pub mod consent;
pub mod context;
mod css;
pub mod document;
pub mod error;
mod html;
pub mod shortcut;
pub mod site;
pub mod storage;
mod strict;
pub mod theme;
pub mod views;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use assets::{AssetKind, AssetRef};
use consent::ConsentRecord;
use context::SiteContext;
use shortcut::ShortcutRegistry;
use site::SiteConfig;
use storage::{FileStore, Persistence};
use theme::ThemeName;
use views::StickyCta;

pub use cli::{Args as CliArgs, Command, ConsentCommand, Mode, RenderArgs, ThemeCommand};
pub use error::PrefsError;

pub fn run(args: CliArgs) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    run_with_output(args, &mut stdout.lock())
}

pub fn run_with_output(args: CliArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let shortcuts = ShortcutRegistry::new();
    let persistence = Persistence::new(FileStore::new(&args.profile));
    let mut ctx = SiteContext::mounted(persistence, &shortcuts);

    match args.command {
        Command::Render(render) => {
            let written = render_site(&ctx, &render)?;
            tracing::info!(path = %written.display(), "site rendered");
            writeln!(out, "{}", written.display())?;
        }
        Command::Theme(cmd) => run_theme(&ctx, cmd, out)?,
        Command::Consent(cmd) => run_consent(&mut ctx, cmd, out)?,
    }

    if ctx.is_degraded() {
        anyhow::bail!(
            "could not write profile {}; the change was not saved",
            args.profile.display()
        );
    }
    Ok(())
}

fn run_theme(ctx: &SiteContext, cmd: ThemeCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let mut theme = ctx.theme()?;
    match cmd {
        ThemeCommand::Get => writeln!(out, "{}", theme.get())?,
        ThemeCommand::List => {
            let current = theme.get();
            for name in ThemeName::ALL {
                let d = name.descriptor();
                let mark = if name == current { '*' } else { ' ' };
                writeln!(out, "{mark} {:<13} {:<13} {}", name, d.label, d.description)?;
            }
        }
        ThemeCommand::Set { name } => {
            let selected = theme.set_by_name(name.trim()).with_context(|| {
                let known: Vec<&str> = ThemeName::ALL.iter().map(|t| t.as_str()).collect();
                format!("expected one of: {}", known.join(", "))
            })?;
            writeln!(out, "{selected}")?;
        }
        ThemeCommand::Cycle => writeln!(out, "{}", theme.cycle())?,
    }
    Ok(())
}

fn run_consent(
    ctx: &mut SiteContext,
    cmd: ConsentCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let store = ctx.consent_mut()?;
    match cmd {
        ConsentCommand::Status => {}
        ConsentCommand::AcceptAll => store.accept_all(),
        ConsentCommand::Dismiss => store.dismiss_minimal(),
        ConsentCommand::Save {
            analytics,
            marketing,
            functional,
        } => store.save_preferences(ConsentRecord {
            analytics,
            marketing,
            functional,
        }),
    }
    match store.record() {
        Some(record) => writeln!(out, "{}", serde_json::to_string(&record)?)?,
        None => writeln!(out, "undecided")?,
    }
    Ok(())
}

fn render_site(ctx: &SiteContext, args: &RenderArgs) -> anyhow::Result<PathBuf> {
    let site = SiteConfig::load(args.config.as_deref())?;
    let css_text = css::bundle_css();
    let js_text = builtin::prefs_runtime_js();
    let sticky = StickyCta::new();

    let (html, out_path) = match args.mode {
        Mode::Dir => {
            let out_dir = args.out.clone().unwrap_or_else(|| PathBuf::from("out"));
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("create {}", out_dir.display()))?;
            let css_rel = assets::write_asset(
                &out_dir,
                &args.assets_dir_name,
                AssetKind::Css,
                css_text.as_bytes(),
            )?;
            let js_rel = assets::write_asset(
                &out_dir,
                &args.assets_dir_name,
                AssetKind::Js,
                js_text.as_bytes(),
            )?;
            let html = html::build_page(
                ctx,
                &site,
                &sticky,
                &AssetRef::Linked(css_rel),
                &AssetRef::Linked(js_rel),
            )?;
            (html, out_dir.join("index.html"))
        }
        Mode::Single => {
            let out_path = args
                .out
                .clone()
                .unwrap_or_else(|| PathBuf::from("index.html"));
            create_parent(&out_path)?;
            let html = html::build_page(
                ctx,
                &site,
                &sticky,
                &AssetRef::Inline(css_text),
                &AssetRef::Inline(js_text),
            )?;
            (html, out_path)
        }
    };

    let record = ctx.consent()?.record();
    strict::assert_consent_gated(&html, record.as_ref(), site.base_url.as_ref())?;

    std::fs::write(&out_path, html).with_context(|| format!("write {}", out_path.display()))?;
    Ok(out_path)
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    Ok(())
}
