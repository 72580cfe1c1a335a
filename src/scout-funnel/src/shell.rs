//! Line commands accepted by the terminal host, and the text rendering of
//! each step.

use std::fmt::Write as _;

use anyhow::{anyhow, bail, Result};
use funnel_core::profile::FunnelProfile;
use funnel_core::types::{Campaign, Challenge, TeamSize};
use funnel_wizard::draft::LeadDraft;
use funnel_wizard::view::landing_headline;
use funnel_wizard::{FieldUpdate, FunnelView, Step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Next,
    Back,
    Forward,
    Challenge(Challenge),
    Campaign(Campaign),
    Set(FieldUpdate),
    Submit,
    Dismiss,
    Json,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_lowercase().as_str() {
            "" | "show" => Command::Show,
            "next" | "n" => Command::Next,
            "back" | "b" => Command::Back,
            "forward" | "f" => Command::Forward,
            "challenge" | "c" => Command::Challenge(rest.parse()?),
            "campaign" | "p" => Command::Campaign(rest.parse()?),
            "set" => Command::Set(parse_field(rest)?),
            "submit" => Command::Submit,
            "ok" | "dismiss" => Command::Dismiss,
            "json" => Command::Json,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command '{other}', try 'help'"),
        };
        Ok(command)
    }
}

impl Command {
    /// Rejects tags the active profile does not list.
    pub fn ensure_offered(&self, profile: &FunnelProfile) -> Result<()> {
        match self {
            Command::Challenge(tag) if !profile.offers_challenge(*tag) => {
                bail!("'{tag}' is not offered by the {} funnel", profile.name)
            }
            Command::Campaign(tag) if !profile.offers_campaign(*tag) => {
                bail!("'{tag}' is not offered by the {} funnel", profile.name)
            }
            _ => Ok(()),
        }
    }
}

fn parse_field(input: &str) -> Result<FieldUpdate> {
    let (name, value) = input
        .split_once(char::is_whitespace)
        .map(|(n, v)| (n, v.trim()))
        .unwrap_or((input, ""));

    let update = match name.to_lowercase().as_str() {
        "email" => FieldUpdate::Email(value.to_string()),
        "name" | "first_name" => FieldUpdate::FirstName(value.to_string()),
        "company" | "company_name" => FieldUpdate::CompanyName(value.to_string()),
        "team" | "team_size" => {
            let size = if value.is_empty() {
                None
            } else {
                Some(value.parse::<TeamSize>()?)
            };
            FieldUpdate::TeamSize(size)
        }
        "challenge-text" => FieldUpdate::ChallengeCustom(value.to_string()),
        "campaign-text" => FieldUpdate::CampaignCustom(value.to_string()),
        "" => return Err(anyhow!("usage: set <field> <value>")),
        other => bail!("unknown field '{other}'"),
    };
    Ok(update)
}

pub const HELP: &str = "\
commands:
  next | back | forward          move through the funnel
  challenge <tag>                toggle a challenge
  campaign <tag>                 toggle a campaign
  set email|name|company <text>  fill in contact details
  set team <1-5|6-20|...|1000+>  pick a team size (empty to clear)
  set challenge-text <text>      describe your own challenge
  set campaign-text <text>       describe your own campaign
  submit                         send the contact form
  ok                             dismiss an error notice
  json                           dump the current view as JSON
  quit";

fn mark(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn render(view: &FunnelView, draft: &LeadDraft, profile: &FunnelProfile) -> String {
    let mut out = String::new();

    let dots: String = view
        .progress
        .iter()
        .map(|d| if d.current { '●' } else { '○' })
        .collect();
    let _ = writeln!(out, "\n{dots}   step {}", view.step);

    match view.step {
        Step::Landing => {
            let _ = writeln!(out, "{}", landing_headline(view.opportunity_count));
        }
        Step::Challenges => {
            let _ = writeln!(out, "What's your biggest GTM challenge right now?");
            for option in &profile.challenges {
                let selected = draft.challenges.contains(&option.tag);
                let _ = writeln!(out, "  {} {:<16} {}", mark(selected), option.tag, option.title);
            }
            if !draft.challenge_custom.trim().is_empty() {
                let _ = writeln!(out, "  your words: {}", draft.challenge_custom.trim());
            }
        }
        Step::Campaigns => {
            let _ = writeln!(out, "Scout can run these campaigns for you");
            if view.campaign_total > 0 {
                let _ = writeln!(
                    out,
                    "  campaign power: {} selected ({:.0}%)",
                    view.campaign_total,
                    view.campaign_power * 100.0
                );
            }
            for option in &profile.campaigns {
                let selected = draft.campaigns.contains(&option.tag);
                let _ = writeln!(
                    out,
                    "  {} {:<13} {} - {}",
                    mark(selected),
                    option.tag,
                    option.title,
                    option.description
                );
            }
            if !draft.campaign_custom.trim().is_empty() {
                let _ = writeln!(out, "  your words: {}", draft.campaign_custom.trim());
            }
        }
        Step::Contact => {
            let _ = writeln!(
                out,
                "Scout has {} campaign previews ready for you",
                view.campaign_total
            );
            let _ = writeln!(out, "  email:   {}", draft.email);
            let _ = writeln!(out, "  name:    {}", draft.first_name);
            let _ = writeln!(out, "  company: {}", draft.company_name);
            let team = draft.team_size.map(|t| t.to_string()).unwrap_or_default();
            let _ = writeln!(out, "  team:    {team}");
            if view.loading {
                let _ = writeln!(out, "  Activating Scout...");
            }
        }
        Step::Confirmation => match &view.confirmation {
            Some(confirmation) => {
                let _ = writeln!(out, "{}", confirmation.headline);
                let _ = writeln!(out, "{}", confirmation.message);
                if let Some(url) = &confirmation.demo_url {
                    let _ = writeln!(out, "Schedule a demo: {url}");
                }
            }
            None => {
                let _ = writeln!(out, "Nothing submitted yet in this session.");
            }
        },
    }

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "!! {notice} (type 'ok' to dismiss)");
    }
    if !view.step.is_terminal() && view.step != Step::Contact && view.next_visible {
        let _ = writeln!(out, "(type 'next' to continue)");
    }
    out
}
