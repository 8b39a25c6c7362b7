// Branding commands

use async_lock::RwLock;
use clap::Subcommand;
use portal_app::{workflows, AppCore};
use portal_authorization::{BrandingOverride, Color, Project, ProjectId};
use std::sync::Arc;

#[derive(Subcommand)]
pub enum BrandingCommand {
    /// Show effective branding
    Show {
        /// Project id; defaults to the selected project
        project: Option<ProjectId>,
    },

    /// Override part of a project's branding
    Set {
        /// Project id
        project: ProjectId,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Logo path or URL
        #[arg(long)]
        logo: Option<String>,

        /// Primary color (#RRGGBB)
        #[arg(long, value_parser = Color::parse)]
        primary: Option<Color>,

        /// Secondary color (#RRGGBB)
        #[arg(long, value_parser = Color::parse)]
        secondary: Option<Color>,

        /// Accent color (#RRGGBB)
        #[arg(long, value_parser = Color::parse)]
        accent: Option<Color>,

        /// Background color (#RRGGBB)
        #[arg(long, value_parser = Color::parse)]
        background: Option<Color>,

        /// Text color (#RRGGBB)
        #[arg(long, value_parser = Color::parse)]
        text: Option<Color>,
    },

    /// Restore a project's default branding
    Clear {
        /// Project id
        project: ProjectId,
    },
}

pub async fn run(app: &Arc<RwLock<AppCore>>, command: BrandingCommand) -> anyhow::Result<()> {
    match command {
        BrandingCommand::Show { project } => {
            let selected = workflows::current_session(app).await.selected_project();
            let Some(project) = project.or(selected) else {
                anyhow::bail!("no project given and none selected");
            };
            print_project(&workflows::effective_project(app, project).await);
        }
        BrandingCommand::Set {
            project,
            name,
            logo,
            primary,
            secondary,
            accent,
            background,
            text,
        } => {
            let mut patch = BrandingOverride {
                name,
                logo,
                ..BrandingOverride::default()
            };
            patch.colors.primary = primary;
            patch.colors.secondary = secondary;
            patch.colors.accent = accent;
            patch.colors.background = background;
            patch.colors.text = text;
            print_project(&workflows::update_branding(app, project, &patch).await?);
        }
        BrandingCommand::Clear { project } => {
            print_project(&workflows::clear_branding(app, project).await?);
        }
    }
    Ok(())
}

fn print_project(project: &Project) {
    let colors = &project.colors;
    println!("Project:     {} ({})", project.name, project.id);
    println!("Description: {}", project.description);
    println!("Logo:        {}", project.logo);
    println!(
        "Colors:      primary {} secondary {} accent {} background {} text {}",
        colors.primary.as_str(),
        colors.secondary.as_str(),
        colors.accent.as_str(),
        colors.background.as_str(),
        colors.text.as_str()
    );
}
