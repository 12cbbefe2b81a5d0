//! Text layout of a resolved player record.

use chrono::DateTime;
use chrono::Utc;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use warden_core::BanDisplayState;
use warden_core::PlayerRecord;
use warden_core::actions::player_actions;
use warden_core::ban_state;
use warden_core::model::JobBan;
use warden_core::model::Note;
use warden_core::notes::NoteTag;
use warden_core::notes::note_tag;
use warden_core::notes::visible_notes;

use crate::references::RefLines;

const UNKNOWN: &str = "Unknown";

pub(crate) fn record_lines(
    out: &mut RefLines,
    record: &PlayerRecord,
    now: DateTime<Utc>,
    actions_enabled: bool,
) {
    out.push(Line::from(Span::from(record.ckey.clone()).bold()));
    out.blank();

    ban_banner(out, &ban_state::evaluate(record, now));

    if actions_enabled {
        let mut spans = vec!["Actions: ".dim()];
        for (i, action) in player_actions(record).into_iter().enumerate() {
            if i > 0 {
                spans.push(" ".into());
            }
            spans.push(Span::from(format!("[{}]", action.label())).yellow());
        }
        out.push(Line::from(spans));
        out.blank();
    }

    out.heading("Details");
    detail(out, "Last Seen", &record.last_login);
    detail(out, "Last Known CID", &record.last_known_cid);
    detail(out, "Last Known IP", &record.last_known_ip);
    detail(
        out,
        "BYOND Account Age",
        record.byond_account_age.as_deref().unwrap_or(UNKNOWN),
    );
    detail(
        out,
        "First Join Date",
        record.first_join_date.as_deref().unwrap_or(UNKNOWN),
    );
    let discord = record
        .discord_id
        .map_or_else(|| "Not Linked".to_string(), |id| id.to_string());
    detail(out, "Discord ID", &discord);
    let whitelists = record.whitelist_entries().len();
    if whitelists > 0 {
        detail(out, "Role Whitelists", &whitelists.to_string());
    }
    out.blank();

    out.heading("Notes");
    let mut any_note = false;
    for note in visible_notes(&record.notes) {
        any_note = true;
        note_lines(out, note, false);
    }
    if !any_note {
        out.push("No notes.".dim());
    }
    out.blank();

    out.heading("Job Bans");
    if record.job_bans.is_empty() {
        out.push("No job bans.".dim());
    }
    for job_ban in &record.job_bans {
        job_ban_lines(out, job_ban);
    }
}

fn detail(out: &mut RefLines, label: &str, value: &str) {
    out.push(Line::from(vec![
        Span::from(format!("{label}: ")).dim(),
        Span::from(value.to_string()),
    ]));
}

fn ban_banner(out: &mut RefLines, state: &BanDisplayState) {
    let (title, color, reason, date, expires) = match state {
        BanDisplayState::Permanent { reason, date, .. } => {
            ("PERMABANNED", Color::Red, reason, date, None)
        }
        BanDisplayState::TemporaryActive {
            reason,
            date,
            expires_at,
            ..
        } => ("TEMPBANNED", Color::Magenta, reason, date, Some(*expires_at)),
        BanDisplayState::None | BanDisplayState::TemporaryExpired => return,
    };

    let bar = Style::default().fg(color);
    out.push(Line::from(Span::styled(format!(" {title} "), bar.reversed().bold())));

    let mut placed = vec![
        Span::styled("│ ", bar),
        "Placed: ".dim(),
        Span::from(date.clone().unwrap_or_else(|| UNKNOWN.to_string())),
    ];
    if let Some(expires_at) = expires {
        placed.push(" Expires: ".dim());
        placed.push(Span::from(
            expires_at.format("%a %d %b %Y %H:%M:%S UTC").to_string(),
        ));
    }
    out.push(Line::from(placed));
    out.push(Line::from(vec![
        Span::styled("│ ", bar),
        "Reason: ".dim(),
        Span::from(reason.clone().unwrap_or_default()),
    ]));
    let admin = out.reference(state.admin());
    out.push(Line::from(vec![Span::styled("│ ", bar), "By: ".dim(), admin]));
    out.blank();
}

fn tag_span(tag: NoteTag) -> Span<'static> {
    let color = match tag {
        NoteTag::Ban => Color::Red,
        NoteTag::Merit => Color::Green,
        NoteTag::Whitelist => Color::Blue,
        NoteTag::Admin => Color::Yellow,
    };
    Span::styled(tag.label(), Style::default().fg(color))
}

/// A note and its attribution line. `applied` adds the noted player, for
/// the notes an admin has placed on others.
pub(crate) fn note_lines(out: &mut RefLines, note: &Note, applied: bool) {
    out.push(Line::from(vec![
        tag_span(note_tag(note)),
        " ".into(),
        Span::from(note.text.clone().unwrap_or_default()),
    ]));

    let mut footer = vec!["    ".into()];
    if applied {
        footer.push("to ".dim().italic());
        footer.push(out.reference(note.noted_player_ckey.as_deref()));
        footer.push(" ".into());
    }
    footer.push("by ".dim().italic());
    footer.push(out.reference(note.noting_admin_ckey.as_deref()));
    footer.push(Span::from(format!(" ({})", note.admin_rank)).dim().italic());
    if note.is_confidential {
        footer.push(" [CONFIDENTIALLY]".magenta().italic());
    }
    footer.push(Span::from(format!(" on {}", note.date)).dim().italic());
    out.push(Line::from(footer));
}

fn job_ban_lines(out: &mut RefLines, job_ban: &JobBan) {
    out.push(format!("{} - {}", job_ban.role.to_uppercase(), job_ban.text));
    let admin = out.reference(job_ban.banning_admin_ckey.as_deref());
    out.push(Line::from(vec![
        "    by ".dim().italic(),
        admin,
        Span::from(format!(" on {}", job_ban.date)).dim().italic(),
    ]));
}
