use strum_macros::{AsRefStr, Display, EnumIter};

use super::OutgoingMail;
use crate::challenge::models::ChallengeModel;
use crate::player::models::PlayerModel;

/// The kinds of challenge notification, named after the template they use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    NewChallenge,
    ChallengeUpdated,
}

/// Everything a challenge notification renders from
#[derive(Debug, Clone)]
pub struct NotificationContext {
    pub challenge: ChallengeModel,
    pub from_player: PlayerModel,
    pub to_player: PlayerModel,
}

/// A notification about a challenge, sent to the challenged player
/// from the challenger's address.
#[derive(Debug, Clone)]
pub enum ChallengeNotification {
    NewChallenge(NotificationContext),
    ChallengeUpdated(NotificationContext),
}

impl ChallengeNotification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            ChallengeNotification::NewChallenge(_) => NotificationKind::NewChallenge,
            ChallengeNotification::ChallengeUpdated(_) => NotificationKind::ChallengeUpdated,
        }
    }

    pub fn context(&self) -> &NotificationContext {
        match self {
            ChallengeNotification::NewChallenge(context) => context,
            ChallengeNotification::ChallengeUpdated(context) => context,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            ChallengeNotification::NewChallenge(_) => "New Challenge on Latter",
            ChallengeNotification::ChallengeUpdated(_) => "Updated Challenge on Latter",
        }
    }

    pub fn template_name(&self) -> &'static str {
        match self.kind() {
            NotificationKind::NewChallenge => "new_challenge",
            NotificationKind::ChallengeUpdated => "challenge_updated",
        }
    }

    pub fn render_body(&self) -> String {
        match self {
            ChallengeNotification::NewChallenge(ctx) => format!(
                "Hi {to},\n\n{from} has challenged you to a game on Latter.\n\
                 Challenge id: {id}\n\nGood luck!\n",
                to = ctx.to_player.name,
                from = ctx.from_player.name,
                id = ctx.challenge.id,
            ),
            ChallengeNotification::ChallengeUpdated(ctx) => {
                let score = |score: Option<i32>| {
                    score.map_or_else(|| "-".to_string(), |s| s.to_string())
                };
                let winner = match ctx.challenge.winner_id.as_deref() {
                    Some(id) if id == ctx.from_player.id => ctx.from_player.name.as_str(),
                    Some(id) if id == ctx.to_player.id => ctx.to_player.name.as_str(),
                    _ => "nobody yet",
                };
                format!(
                    "Hi {to},\n\nThe result of your challenge with {from} has been recorded.\n\
                     {from} {from_score} - {to_score} {to}\nWinner: {winner}\n",
                    to = ctx.to_player.name,
                    from = ctx.from_player.name,
                    from_score = score(ctx.challenge.from_player_score),
                    to_score = score(ctx.challenge.to_player_score),
                )
            }
        }
    }

    pub fn to_mail(&self) -> OutgoingMail {
        let ctx = self.context();
        OutgoingMail {
            to: ctx.to_player.email.clone(),
            from: ctx.from_player.email.clone(),
            subject: self.subject().to_string(),
            body: self.render_body(),
        }
    }
}
