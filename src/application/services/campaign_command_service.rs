//! Campaign Command Service - Routes chat commands to the game rules
//!
//! One inbound message becomes at most one turn:
//! 1. The message is parsed against the campaign trigger
//! 2. The campaign is loaded under a per-campaign lock
//! 3. The matching resolver mutates the in-memory aggregate
//! 4. Player turns are followed by one monster sweep
//! 5. Whatever changed is written back, then every reply is delivered
//!
//! Resolvers never persist on their own. They report what they touched through
//! [`TurnEffects`] and this service does the writing, so a failed save shows up
//! in the [`CommandOutcome`] instead of disappearing.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::application::dto::{
    CampaignCommand, CommandOutcome, Heading, InboundMessage, MapScope, ParsedInput,
    PersistenceReport, Reply, TurnEffects,
};
use crate::application::ports::outbound::{
    CampaignRepositoryPort, DiceRoller, MessageTransportPort, PersistenceError,
};
use crate::application::services::{
    CombatService, CommandError, MapService, MonsterAction, MonsterBounds, MonsterTurnService,
    MovementService, PerceptionService,
};
use crate::domain::aggregates::Campaign;
use crate::domain::entities::Character;
use crate::domain::value_objects::{CampaignId, ChannelId, Reach, RoleId, UserId};

/// Runtime knobs for command handling
#[derive(Debug, Clone)]
pub struct CampaignSettings {
    /// Prefix that marks a message as a campaign command, e.g. `!c`
    pub trigger: String,
    /// Role required to `stop` a campaign
    pub moderator_role: RoleId,
    /// Extra attempts after a failed write
    pub save_retries: u32,
}

/// Replies and effects of one resolved command, before anything is written
#[derive(Debug, Default)]
struct Turn {
    replies: Vec<Reply>,
    effects: TurnEffects,
    monster_turn: bool,
}

impl Turn {
    fn reply(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            ..Default::default()
        }
    }

    fn texts(lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            replies: lines.into_iter().map(Reply::text).collect(),
            ..Default::default()
        }
    }
}

pub struct CampaignCommandService {
    repository: Arc<dyn CampaignRepositoryPort>,
    settings: CampaignSettings,
    movement: MovementService,
    combat: CombatService,
    perception: PerceptionService,
    map: MapService,
    monster_turns: MonsterTurnService,
    locks: RwLock<HashMap<CampaignId, Arc<Mutex<()>>>>,
}

impl CampaignCommandService {
    pub fn new(
        repository: Arc<dyn CampaignRepositoryPort>,
        dice: Arc<dyn DiceRoller>,
        settings: CampaignSettings,
        bounds: MonsterBounds,
    ) -> Self {
        Self {
            repository,
            settings,
            movement: MovementService::new(),
            combat: CombatService::new(),
            perception: PerceptionService::new(),
            map: MapService::new(),
            monster_turns: MonsterTurnService::new(dice, bounds),
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Handle a message and deliver every reply through `transport`.
    ///
    /// Returns `None` when the message is not addressed to the campaign engine.
    pub async fn execute(
        &self,
        message: &InboundMessage,
        transport: &dyn MessageTransportPort,
    ) -> Option<CommandOutcome> {
        let outcome = self.handle(message).await?;
        deliver(transport, &message.channel_id, &outcome.replies).await;
        Some(outcome)
    }

    /// Handle a message without delivering anything.
    #[instrument(skip(self, message), fields(campaign_id = %message.campaign_id, author = %message.author_id))]
    pub async fn handle(&self, message: &InboundMessage) -> Option<CommandOutcome> {
        if message.author_is_bot {
            return None;
        }

        let command = match CampaignCommand::parse(&message.content, &self.settings.trigger) {
            ParsedInput::NotACommand => return None,
            ParsedInput::Unknown(verb) => {
                debug!(%verb, "Unknown campaign verb");
                let reply = CommandError::UnknownCommand {
                    user: message.author_id.clone(),
                    verb: verb.clone(),
                }
                .reply();
                return Some(CommandOutcome::reply_only(verb, vec![reply]));
            }
            ParsedInput::Command(command) => command,
        };
        let verb = command.verb();

        if command == CampaignCommand::Stop && !message.has_role(&self.settings.moderator_role) {
            warn!("Stop refused: author is not a moderator");
            let reply = CommandError::PermissionDenied {
                user: message.author_id.clone(),
                requirement: self.settings.moderator_role.to_string(),
            }
            .reply();
            return Some(CommandOutcome::reply_only(verb, vec![reply]));
        }

        let outcome = self
            .with_campaign_lock(&message.campaign_id, self.run_turn(message, command))
            .await;
        Some(outcome)
    }

    /// Store a whole campaign, replacing any previous state with the same id.
    ///
    /// Waits for the command in flight on that campaign, if any.
    pub async fn import(&self, campaign: &Campaign) -> Result<(), PersistenceError> {
        self.with_campaign_lock(campaign.id(), async {
            self.repository.save_campaign(campaign).await?;
            info!(campaign_id = %campaign.id(), "Campaign imported");
            Ok(())
        })
        .await
    }

    async fn run_turn(&self, message: &InboundMessage, command: CampaignCommand) -> CommandOutcome {
        let verb = command.verb();
        let mut campaign = match self.repository.load_campaign(&message.campaign_id).await {
            Ok(campaign) => campaign,
            Err(PersistenceError::NotFound(id)) => {
                debug!("No campaign to run the command against");
                return CommandOutcome::reply_only(verb, vec![CommandError::NoCampaign(id).reply()]);
            }
            Err(e) => {
                error!(error = %e, "Failed to load campaign");
                let failed = PersistenceReport::Failed {
                    error: e.to_string(),
                };
                let mut outcome = CommandOutcome::reply_only(
                    verb,
                    vec![CommandError::Persistence(e).reply()],
                );
                outcome.persistence = failed;
                return outcome;
            }
        };

        let mut turn = match self.resolve(&mut campaign, &message.author_id, &command) {
            Ok(turn) => turn,
            Err(e) => {
                debug!(error = %e, "Command resolved to a refusal");
                Turn::reply(e.reply())
            }
        };

        let persistence = self.persist(&campaign, &turn.effects).await;
        match &persistence {
            PersistenceReport::Failed { error } => {
                error!(%error, verb, "Turn could not be saved; in-memory state was discarded");
                turn.replies.push(
                    CommandError::Persistence(PersistenceError::Database(error.clone())).reply(),
                );
            }
            PersistenceReport::Deleted => info!("Campaign deleted"),
            _ => {}
        }

        CommandOutcome {
            verb: verb.to_string(),
            replies: turn.replies,
            persistence,
            monster_turn: turn.monster_turn,
        }
    }

    // ========================================================================
    // Per-campaign locks
    // ========================================================================

    /// Run `work` while holding the campaign's lock.
    ///
    /// The map entry is dropped again once nobody holds or waits for the lock, so
    /// ids that never existed do not accumulate.
    async fn with_campaign_lock<T>(&self, id: &CampaignId, work: impl Future<Output = T>) -> T {
        let lock = self.lock_for(id).await;
        let result = {
            let _guard = lock.lock().await;
            work.await
        };
        drop(lock);
        self.release_lock(id).await;
        result
    }

    async fn lock_for(&self, id: &CampaignId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(id) {
            return lock.clone();
        }
        self.locks
            .write()
            .await
            .entry(id.clone())
            .or_default()
            .clone()
    }

    async fn release_lock(&self, id: &CampaignId) {
        let mut locks = self.locks.write().await;
        // Handing out a lock needs the map, so a count of one cannot grow under us
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    fn resolve(
        &self,
        campaign: &mut Campaign,
        uid: &UserId,
        command: &CampaignCommand,
    ) -> Result<Turn, CommandError> {
        match command {
            CampaignCommand::Info => Ok(Turn::texts([
                format!("Welcome to campaign {}", campaign.id()),
                format!("There are {} weary travellers.", campaign.character_count()),
            ])),
            CampaignCommand::Stop => Ok(Turn {
                replies: vec![Reply::text("The campaign has ended!")],
                effects: TurnEffects {
                    delete_campaign: true,
                    ..Default::default()
                },
                monster_turn: false,
            }),
            CampaignCommand::Status => {
                let actor = actor(campaign, uid)?;
                Ok(Turn::reply(Reply::text(status_card(actor))))
            }
            CampaignCommand::Leave => {
                let left = campaign
                    .remove_character(uid)
                    .ok_or_else(|| CommandError::MissingCharacter { user: uid.clone() })?;
                info!(uid = %uid, name = %left.name, "Character left the campaign");
                Ok(Turn {
                    replies: vec![Reply::mention(
                        uid,
                        format!("your character **{}** has left the campaign.", left.name),
                    )],
                    effects: TurnEffects {
                        campaign: true,
                        ..Default::default()
                    },
                    monster_turn: false,
                })
            }
            CampaignCommand::Walk(Heading::Missing) => {
                let actor = actor(campaign, uid)?;
                Ok(Turn::reply(Reply::text(format!(
                    "> {} remains in place.",
                    actor.name
                ))))
            }
            CampaignCommand::Walk(heading) => {
                let name = able_actor(campaign, uid)?.name.clone();
                let reply = match heading {
                    Heading::Toward(direction) => {
                        match self.movement.walk(campaign, uid, *direction) {
                            Ok(step) => Reply::text(step.message),
                            Err(
                                refused @ (CommandError::Blocked { .. }
                                | CommandError::OutOfBounds { .. }),
                            ) => {
                                debug!(error = %refused, "Step refused; the turn still passes");
                                refused.reply()
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    _ => Reply::text(format!("> {} remains in place.", name)),
                };
                let mut turn = Turn::reply(reply);
                turn.effects.touch_character(uid);
                self.monster_sweep(campaign, &mut turn, None);
                Ok(turn)
            }
            CampaignCommand::Map(MapScope::Location) => {
                Ok(Turn::reply(Reply::text(self.map.location(campaign, uid)?)))
            }
            CampaignCommand::Map(scope) => {
                let reach = match scope {
                    MapScope::All => Reach::Unlimited,
                    _ => Reach::SIGHT,
                };
                let lines = self.map.render(campaign, uid, reach)?;
                Ok(Turn::reply(Reply::Lines {
                    lines,
                    paginate: true,
                }))
            }
            CampaignCommand::Look => Ok(Turn::texts(self.perception.look(campaign, uid)?)),
            CampaignCommand::Examine(target) => {
                let actor = actor(campaign, uid)?;
                let Some(target) = target else {
                    return Err(CommandError::TargetNotFound {
                        actor: actor.name.clone(),
                        target: String::new(),
                    });
                };
                Ok(Turn::texts(self.perception.examine(campaign, uid, target)?))
            }
            CampaignCommand::Attack(None) => {
                actor(campaign, uid)?;
                Ok(Turn::reply(Reply::mention(
                    uid,
                    format!(
                        "who should I attack? Try `{} attack <name>`.",
                        self.settings.trigger
                    ),
                )))
            }
            CampaignCommand::Attack(Some(target)) => {
                able_actor(campaign, uid)?;
                let report = self.combat.attack(campaign, uid, target)?;
                debug!(result = ?report.result, "Attack resolved");
                let mut turn = Turn::texts(report.messages);
                turn.effects = report.effects;
                self.monster_sweep(campaign, &mut turn, Some(MonsterAction::Attack));
                Ok(turn)
            }
        }
    }

    fn monster_sweep(
        &self,
        campaign: &mut Campaign,
        turn: &mut Turn,
        favoured: Option<MonsterAction>,
    ) {
        let report = self.monster_turns.take_turn(campaign, favoured);
        turn.replies.extend(report.messages.into_iter().map(Reply::text));
        turn.effects.merge(report.effects);
        turn.monster_turn = true;
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    async fn persist(&self, campaign: &Campaign, effects: &TurnEffects) -> PersistenceReport {
        if effects.is_read_only() {
            return PersistenceReport::Untouched;
        }

        let attempts = self.settings.save_retries + 1;
        let mut last_error = None;
        for attempt in 1..=attempts {
            match self.write_effects(campaign, effects).await {
                Ok(()) if effects.delete_campaign => return PersistenceReport::Deleted,
                Ok(()) => return PersistenceReport::Saved,
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Campaign write failed");
                    last_error = Some(e);
                }
            }
        }

        PersistenceReport::Failed {
            error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown persistence failure".to_string()),
        }
    }

    async fn write_effects(
        &self,
        campaign: &Campaign,
        effects: &TurnEffects,
    ) -> Result<(), PersistenceError> {
        let id = campaign.id();
        if effects.delete_campaign {
            return self.repository.delete_campaign(id).await;
        }

        for uid in &effects.characters {
            if let Some(character) = campaign.character(uid) {
                self.repository.save_character(id, character).await?;
            }
        }
        for monster_id in &effects.monsters {
            if let Some(monster) = campaign.monster(monster_id) {
                self.repository.save_monster(id, monster).await?;
            }
        }
        if effects.campaign {
            self.repository.save_campaign(campaign).await?;
        }
        Ok(())
    }
}

fn actor<'a>(campaign: &'a Campaign, uid: &UserId) -> Result<&'a Character, CommandError> {
    campaign
        .character(uid)
        .ok_or_else(|| CommandError::MissingCharacter { user: uid.clone() })
}

/// The acting character, provided it can still move and fight
fn able_actor<'a>(campaign: &'a Campaign, uid: &UserId) -> Result<&'a Character, CommandError> {
    let character = actor(campaign, uid)?;
    if character.is_incapacitated() {
        return Err(CommandError::Incapacitated {
            actor: character.name.clone(),
        });
    }
    Ok(character)
}

fn status_card(character: &Character) -> String {
    let hearts = character.current_health.max(0) as usize;
    let broken = (character.max_health - character.current_health).max(0) as usize;
    [
        format!(
            "> **{}** stops for a moment to look at themselves.",
            character.name
        ),
        format!("> HP: {}{}", ":heart:".repeat(hearts), ":broken_heart:".repeat(broken)),
        format!(
            "> :crossed_swords: {} :shield: {}",
            character.power, character.defense
        ),
    ]
    .join("\n")
}

/// Send replies in order. A failed delivery is logged and does not stop the rest.
async fn deliver(transport: &dyn MessageTransportPort, channel: &ChannelId, replies: &[Reply]) {
    for reply in replies {
        let result = match reply {
            Reply::Text { text } => transport.send_text(channel, text).await,
            Reply::Mention { user, text } => {
                transport
                    .send_text(channel, &format!("<@{}>, {}", user, text))
                    .await
            }
            Reply::Lines { lines, paginate } => {
                transport.send_lines(channel, lines, *paginate).await
            }
        };
        if let Err(e) = result {
            warn!(channel = %channel, error = %e, "Failed to deliver reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{
        MockCampaignRepositoryPort, MockMessageTransportPort, TransportError,
    };
    use crate::application::services::test_fixtures::{
        campaign_from_rows, goblin, hero, ScriptedDice,
    };
    use crate::domain::entities::Monster;
    use crate::domain::value_objects::Position;
    use crate::infrastructure::persistence::InMemoryCampaignRepository;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    const MOD_ROLE: &str = "role-mod";

    fn settings() -> CampaignSettings {
        CampaignSettings {
            trigger: "!c".to_string(),
            moderator_role: RoleId::from(MOD_ROLE),
            save_retries: 1,
        }
    }

    fn service(
        repository: MockCampaignRepositoryPort,
        rolls: &[(u32, u32)],
    ) -> CampaignCommandService {
        CampaignCommandService::new(
            Arc::new(repository),
            Arc::new(ScriptedDice::new(rolls)),
            settings(),
            MonsterBounds::Strict,
        )
    }

    fn message(content: &str) -> InboundMessage {
        InboundMessage {
            campaign_id: CampaignId::from("test-campaign"),
            channel_id: ChannelId::from("chan-1"),
            author_id: UserId::from("u1"),
            author_roles: vec![],
            author_is_bot: false,
            content: content.to_string(),
        }
    }

    fn loading(campaign: Campaign) -> MockCampaignRepositoryPort {
        let mut repository = MockCampaignRepositoryPort::new();
        repository
            .expect_load_campaign()
            .times(1)
            .returning(move |_| Ok(campaign.clone()));
        repository
    }

    fn silent_transport() -> MockMessageTransportPort {
        let mut transport = MockMessageTransportPort::new();
        transport.expect_send_text().returning(|_, _| Ok(()));
        transport.expect_send_lines().returning(|_, _, _| Ok(()));
        transport
    }

    fn corridor() -> Campaign {
        let mut campaign = campaign_from_rows(&["00000", "00000", "00000"]);
        campaign.add_character(hero("u1", "Aria", 2, 2)).unwrap();
        campaign
    }

    #[tokio::test]
    async fn test_messages_without_trigger_or_from_bots_are_ignored() {
        let service = service(MockCampaignRepositoryPort::new(), &[]);
        let transport = MockMessageTransportPort::new();

        assert!(service.execute(&message("hello there"), &transport).await.is_none());

        let mut bot = message("!c info");
        bot.author_is_bot = true;
        assert!(service.execute(&bot, &transport).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_command_replies_without_loading() {
        let service = service(MockCampaignRepositoryPort::new(), &[]);
        let mut transport = MockMessageTransportPort::new();
        transport
            .expect_send_text()
            .withf(|channel, text| {
                channel.as_str() == "chan-1"
                    && text
                        == "<@u1>, I don't recognize that command. Try again or type `help` for a list of commands."
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = service
            .execute(&message("!C dance"), &transport)
            .await
            .unwrap();

        assert_eq!(outcome.verb, "dance");
        assert_eq!(outcome.persistence, PersistenceReport::Untouched);
        assert!(!outcome.monster_turn);
    }

    #[tokio::test]
    async fn test_stop_without_moderator_role_touches_nothing() {
        let service = service(MockCampaignRepositoryPort::new(), &[]);
        let mut transport = MockMessageTransportPort::new();
        transport
            .expect_send_text()
            .withf(|_, text| text.contains("do not have permission") && text.contains(MOD_ROLE))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = service.execute(&message("!c stop"), &transport).await.unwrap();

        assert_eq!(outcome.persistence, PersistenceReport::Untouched);
    }

    #[tokio::test]
    async fn test_moderator_stop_deletes_the_campaign() {
        let mut repository = loading(corridor());
        repository
            .expect_delete_campaign()
            .withf(|id| id.as_str() == "test-campaign")
            .times(1)
            .returning(|_| Ok(()));
        let service = service(repository, &[]);

        let mut stop = message("!c stop");
        stop.author_roles = vec![RoleId::from(MOD_ROLE)];
        let outcome = service.execute(&stop, &silent_transport()).await.unwrap();

        assert_eq!(outcome.persistence, PersistenceReport::Deleted);
        assert_eq!(outcome.texts(), vec!["The campaign has ended!"]);
        assert!(service.locks.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_walk_moves_runs_monsters_and_saves() {
        let mut campaign = corridor();
        campaign.add_monster(goblin("Goblin", 4, 0)).unwrap();
        let mut repository = loading(campaign);
        repository
            .expect_save_character()
            .withf(|_, c| c.uid.as_str() == "u1" && c.position == Position::new(2, 1))
            .times(1)
            .returning(|_, _| Ok(()));
        repository
            .expect_save_campaign()
            .withf(|c| c.character(&UserId::from("u1")).unwrap().position == Position::new(2, 1))
            .times(1)
            .returning(|_| Ok(()));
        let service = service(repository, &[(2, 1)]);

        let outcome = service
            .execute(&message("!c walk n"), &silent_transport())
            .await
            .unwrap();

        assert_eq!(outcome.texts(), vec!["> Aria takes a step, northward."]);
        assert!(outcome.monster_turn);
        assert_eq!(outcome.persistence, PersistenceReport::Saved);
    }

    #[tokio::test]
    async fn test_blocked_walk_still_passes_the_turn() {
        let mut repository = loading(corridor());
        repository
            .expect_save_character()
            .withf(|_, c| c.position == Position::new(2, 2))
            .times(1)
            .returning(|_, _| Ok(()));
        repository
            .expect_save_campaign()
            .times(1)
            .returning(|_| Ok(()));
        let service = service(repository, &[]);

        let outcome = service
            .execute(&message("!c w s"), &silent_transport())
            .await
            .unwrap();

        assert_eq!(outcome.texts(), vec!["> Aria cannot pass that way."]);
        assert!(outcome.monster_turn);
        assert_eq!(outcome.persistence, PersistenceReport::Saved);
    }

    #[tokio::test]
    async fn test_unknown_direction_passes_the_turn_but_no_direction_does_not() {
        let mut repository = MockCampaignRepositoryPort::new();
        repository
            .expect_load_campaign()
            .times(2)
            .returning(|_| Ok(corridor()));
        repository
            .expect_save_character()
            .times(1)
            .returning(|_, _| Ok(()));
        repository
            .expect_save_campaign()
            .times(1)
            .returning(|_| Ok(()));
        let service = service(repository, &[]);
        let transport = silent_transport();

        let unknown = service.execute(&message("!c walk up"), &transport).await.unwrap();
        assert_eq!(unknown.texts(), vec!["> Aria remains in place."]);
        assert!(unknown.monster_turn);
        assert_eq!(unknown.persistence, PersistenceReport::Saved);

        let missing = service.execute(&message("!c walk"), &transport).await.unwrap();
        assert_eq!(missing.texts(), vec!["> Aria remains in place."]);
        assert!(!missing.monster_turn);
        assert_eq!(missing.persistence, PersistenceReport::Untouched);
    }

    #[tokio::test]
    async fn test_failed_save_is_retried_then_surfaced() {
        let mut repository = loading(corridor());
        repository
            .expect_save_character()
            .times(2)
            .returning(|_, _| Ok(()));
        repository
            .expect_save_campaign()
            .times(2)
            .returning(|_| Err(PersistenceError::Database("disk full".to_string())));
        let service = service(repository, &[]);

        let outcome = service
            .execute(&message("!c walk e"), &silent_transport())
            .await
            .unwrap();

        assert!(matches!(
            outcome.persistence,
            PersistenceReport::Failed { ref error } if error.contains("disk full")
        ));
        let texts = outcome.texts();
        assert_eq!(texts[0], "> Aria takes a step, eastward.");
        assert!(texts.last().unwrap().contains("could not be recorded"));
    }

    #[tokio::test]
    async fn test_attack_invites_retaliation() {
        let mut campaign = corridor();
        let ogre = goblin("Ogre", 2, 2).with_health(10, 10);
        let ogre_id = ogre.id;
        campaign.add_monster(ogre).unwrap();
        let mut repository = loading(campaign);
        repository
            .expect_save_character()
            .withf(|_, c| c.current_health == 9)
            .times(1)
            .returning(|_, _| Ok(()));
        repository
            .expect_save_monster()
            .withf(move |_, m| m.id == ogre_id && m.current_health == 7)
            .times(1)
            .returning(|_, _| Ok(()));
        repository
            .expect_save_campaign()
            .times(1)
            .returning(|_| Ok(()));
        let service = service(repository, &[(20, 17)]);

        let outcome = service
            .execute(&message("!c attack Ogre"), &silent_transport())
            .await
            .unwrap();

        assert_eq!(
            outcome.texts(),
            vec![
                "> **Aria** attacks **Ogre** for 3 damage!",
                "> **Aria** is hit by **Ogre**!",
            ]
        );
        assert!(outcome.monster_turn);
    }

    #[tokio::test]
    async fn test_fallen_character_cannot_walk() {
        let mut campaign = campaign_from_rows(&["000"]);
        campaign
            .add_character(hero("u1", "Aria", 1, 0).with_health(0, 10))
            .unwrap();
        let service = service(loading(campaign), &[]);

        let outcome = service
            .execute(&message("!c walk w"), &silent_transport())
            .await
            .unwrap();

        assert_eq!(
            outcome.texts(),
            vec!["> **Aria** lies motionless on the floor and cannot act."]
        );
        assert_eq!(outcome.persistence, PersistenceReport::Untouched);
    }

    #[tokio::test]
    async fn test_status_and_info_are_read_only() {
        let mut campaign = corridor();
        campaign.character_mut(&UserId::from("u1")).unwrap().take_damage(8);
        let mut repository = MockCampaignRepositoryPort::new();
        repository
            .expect_load_campaign()
            .times(2)
            .returning(move |_| Ok(campaign.clone()));
        let service = service(repository, &[]);
        let transport = silent_transport();

        let status = service.execute(&message("!c status"), &transport).await.unwrap();
        assert_eq!(
            status.texts(),
            vec![format!(
                "> **Aria** stops for a moment to look at themselves.\n> HP: {}{}\n> :crossed_swords: 5 :shield: 1",
                ":heart:".repeat(2),
                ":broken_heart:".repeat(8)
            )]
        );

        let info = service.execute(&message("!c info"), &transport).await.unwrap();
        assert_eq!(
            info.texts(),
            vec![
                "Welcome to campaign test-campaign",
                "There are 1 weary travellers.",
            ]
        );
        assert_eq!(info.persistence, PersistenceReport::Untouched);
    }

    #[tokio::test]
    async fn test_missing_campaign_and_missing_character() {
        let mut repository = MockCampaignRepositoryPort::new();
        repository
            .expect_load_campaign()
            .times(1)
            .returning(|id| Err(PersistenceError::NotFound(id.clone())));
        let outcome = service(repository, &[])
            .execute(&message("!c look"), &silent_transport())
            .await
            .unwrap();
        assert_eq!(
            outcome.texts(),
            vec!["There is no campaign running here. Ask a moderator to start one."]
        );

        let outcome = service(loading(campaign_from_rows(&["0"])), &[])
            .execute(&message("!c leave"), &silent_transport())
            .await
            .unwrap();
        assert!(outcome.texts()[0].starts_with("I couldn't find your character"));
    }

    #[tokio::test]
    async fn test_map_lines_are_paginated() {
        let service = service(loading(corridor()), &[]);
        let mut transport = MockMessageTransportPort::new();
        transport
            .expect_send_lines()
            .withf(|_, lines, paginate| *paginate && lines.len() == 3)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let outcome = service.execute(&message("!c map all"), &transport).await.unwrap();
        assert_eq!(outcome.persistence, PersistenceReport::Untouched);
    }

    #[tokio::test]
    async fn test_delivery_failures_do_not_abort_the_turn() {
        let service = service(loading(corridor()), &[]);
        let mut transport = MockMessageTransportPort::new();
        transport
            .expect_send_text()
            .times(2)
            .returning(|channel, _| Err(TransportError::Closed(channel.clone())));

        let outcome = service.execute(&message("!c look"), &transport).await;
        assert!(outcome.is_some());
    }

    #[tokio::test]
    async fn test_one_lock_per_campaign() {
        let service = service(MockCampaignRepositoryPort::new(), &[]);
        let a = service.lock_for(&CampaignId::from("a")).await;
        let again = service.lock_for(&CampaignId::from("a")).await;
        let b = service.lock_for(&CampaignId::from("b")).await;

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_locks_for_missing_campaigns_are_released() {
        let mut repository = MockCampaignRepositoryPort::new();
        repository
            .expect_load_campaign()
            .times(100)
            .returning(|id| Err(PersistenceError::NotFound(id.clone())));
        let service = service(repository, &[]);

        for n in 0..100 {
            let mut look = message("!c look");
            look.campaign_id = CampaignId::from(format!("missing-{}", n));
            assert!(service.handle(&look).await.is_some());
        }

        assert!(service.locks.read().await.is_empty());
    }

    /// In-memory store whose first load of one campaign parks until released
    struct GatedRepository {
        inner: InMemoryCampaignRepository,
        gated: CampaignId,
        armed: AtomicBool,
        entered: Notify,
        release: Notify,
        loads: StdMutex<HashMap<CampaignId, usize>>,
    }

    impl GatedRepository {
        fn new(gated: &str) -> Self {
            Self {
                inner: InMemoryCampaignRepository::new(),
                gated: CampaignId::from(gated),
                armed: AtomicBool::new(true),
                entered: Notify::new(),
                release: Notify::new(),
                loads: StdMutex::new(HashMap::new()),
            }
        }

        fn loads(&self, id: &str) -> usize {
            self.loads
                .lock()
                .unwrap()
                .get(&CampaignId::from(id))
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait::async_trait]
    impl CampaignRepositoryPort for GatedRepository {
        async fn load_campaign(&self, id: &CampaignId) -> Result<Campaign, PersistenceError> {
            *self.loads.lock().unwrap().entry(id.clone()).or_default() += 1;
            if *id == self.gated && self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.load_campaign(id).await
        }

        async fn save_campaign(&self, campaign: &Campaign) -> Result<(), PersistenceError> {
            self.inner.save_campaign(campaign).await
        }

        async fn save_character(
            &self,
            campaign_id: &CampaignId,
            character: &Character,
        ) -> Result<(), PersistenceError> {
            self.inner.save_character(campaign_id, character).await
        }

        async fn save_monster(
            &self,
            campaign_id: &CampaignId,
            monster: &Monster,
        ) -> Result<(), PersistenceError> {
            self.inner.save_monster(campaign_id, monster).await
        }

        async fn delete_campaign(&self, id: &CampaignId) -> Result<(), PersistenceError> {
            self.inner.delete_campaign(id).await
        }

        async fn find_character(
            &self,
            campaign_id: &CampaignId,
            uid: &UserId,
        ) -> Result<Option<Character>, PersistenceError> {
            self.inner.find_character(campaign_id, uid).await
        }

        async fn find_monster(
            &self,
            campaign_id: &CampaignId,
            name: &str,
        ) -> Result<Option<Monster>, PersistenceError> {
            self.inner.find_monster(campaign_id, name).await
        }
    }

    fn campaign_with(id: &str, uid: &str, name: &str) -> Campaign {
        let grid = campaign_from_rows(&["00000", "00000", "00000"]).grid().clone();
        let mut campaign = Campaign::new(CampaignId::from(id), grid);
        campaign.add_character(hero(uid, name, 2, 2)).unwrap();
        campaign
    }

    fn message_in(campaign: &str, content: &str) -> InboundMessage {
        let mut message = message(content);
        message.campaign_id = CampaignId::from(campaign);
        message
    }

    fn gated_service(repository: Arc<GatedRepository>) -> Arc<CampaignCommandService> {
        Arc::new(CampaignCommandService::new(
            repository,
            Arc::new(ScriptedDice::new(&[])),
            settings(),
            MonsterBounds::Strict,
        ))
    }

    #[tokio::test]
    async fn test_commands_on_one_campaign_run_one_at_a_time() {
        let repository = Arc::new(GatedRepository::new("a"));
        repository.inner.save_campaign(&campaign_with("a", "u1", "Aria")).await.unwrap();
        repository.inner.save_campaign(&campaign_with("b", "u1", "Aria")).await.unwrap();
        let service = gated_service(repository.clone());

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.handle(&message_in("a", "!c look")).await }
        });
        repository.entered.notified().await;

        let second = tokio::spawn({
            let service = service.clone();
            async move { service.handle(&message_in("a", "!c look")).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(repository.loads("a"), 1);
        assert!(!second.is_finished());

        let other = tokio::time::timeout(
            Duration::from_secs(1),
            service.handle(&message_in("b", "!c look")),
        )
        .await;
        assert!(matches!(other, Ok(Some(_))));
        assert_eq!(repository.loads("b"), 1);

        repository.release.notify_one();
        assert!(first.await.unwrap().is_some());
        assert!(second.await.unwrap().is_some());
        assert_eq!(repository.loads("a"), 2);
        assert!(service.locks.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_import_waits_for_the_turn_in_flight() {
        let repository = Arc::new(GatedRepository::new("a"));
        repository.inner.save_campaign(&campaign_with("a", "u1", "Aria")).await.unwrap();
        let service = gated_service(repository.clone());

        let walk = tokio::spawn({
            let service = service.clone();
            async move { service.handle(&message_in("a", "!c walk n")).await }
        });
        repository.entered.notified().await;

        let import = tokio::spawn({
            let service = service.clone();
            async move { service.import(&campaign_with("a", "u2", "Bryn")).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!import.is_finished());

        repository.release.notify_one();
        let walked = walk.await.unwrap().unwrap();
        assert_eq!(walked.persistence, PersistenceReport::Saved);
        import.await.unwrap().unwrap();

        let stored = repository
            .inner
            .load_campaign(&CampaignId::from("a"))
            .await
            .unwrap();
        assert!(stored.character(&UserId::from("u2")).is_some());
        assert!(stored.character(&UserId::from("u1")).is_none());
    }
}
