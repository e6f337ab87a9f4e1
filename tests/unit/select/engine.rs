use super::*;

const FIXTURE: &str = include_str!("../../fixtures/catalog.json");

fn catalog() -> AssetCatalog {
    AssetCatalog::from_json_str(FIXTURE).unwrap()
}

fn plan_for(groups: &[&str], badges: &[&str]) -> RenderPlan {
    let user = UserContext::from_names(groups.iter().copied(), badges.iter().copied());
    select(&user, &catalog())
}

fn image_keys(plan: &RenderPlan) -> Vec<&str> {
    plan.foregrounds.iter().map(|l| l.image.as_str()).collect()
}

fn award_names(plan: &RenderPlan) -> Vec<&str> {
    plan.awards.iter().map(|a| a.name.as_str()).collect()
}

#[test]
fn sergeant_paratrooper_end_to_end() {
    let plan = plan_for(&["Sergeant"], &["Paratrooper"]);
    assert_eq!(
        plan.background.as_ref().map(ImageRef::as_str),
        Some("backgrounds/ba-enlisted")
    );
    assert_eq!(image_keys(&plan), vec!["ranks/sergeant", "quals/paratrooper"]);
    assert!(plan.awards.is_empty());
    assert_eq!(plan.qualifications.len(), 1);
    assert_eq!(plan.qualifications[0].name, "Paratrooper");
    assert_eq!(plan.rank.as_ref().unwrap().name, "Sergeant");
    assert_eq!(plan.foregrounds[0].kind, LayerKind::Rank);
    assert!(!plan.is_suppressed());
}

#[test]
fn highest_rank_wins_regardless_of_group_order() {
    let groups = ["Private", "Captain", "Sergeant", "Lieutenant"];
    let expected = plan_for(&groups, &[]).rank.unwrap().name;
    assert_eq!(expected, "Captain");

    let mut permuted = groups;
    for _ in 0..groups.len() {
        permuted.rotate_left(1);
        assert_eq!(plan_for(&permuted, &[]).rank.unwrap().name, expected);
    }
    permuted.reverse();
    assert_eq!(plan_for(&permuted, &[]).rank.unwrap().name, expected);
}

#[test]
fn background_follows_service_and_category() {
    let plan = plan_for(&["Flight Lieutenant"], &[]);
    assert_eq!(plan.background.unwrap().as_str(), "backgrounds/raf-officer");
    assert_eq!(plan.service, Service::Raf);

    let plan = plan_for(&["Major"], &[]);
    assert_eq!(plan.background.unwrap().as_str(), "backgrounds/ba-officer");
}

#[test]
fn fallback_lists_select_background_only() {
    let plan = plan_for(&["Recruit", "7RHA"], &[]);
    assert!(plan.rank.is_none());
    assert_eq!(
        plan.background.as_ref().unwrap().as_str(),
        "backgrounds/ba-enlisted"
    );
    assert_eq!(image_keys(&plan), vec!["crests/7rha", "lanyards/7rha"]);

    let plan = plan_for(&["Enlisted", "Officers"], &[]);
    assert_eq!(plan.background.as_ref().unwrap().as_str(), "backgrounds/ba-officer");
    assert!(plan.is_suppressed(), "fallback draws no rank layer");
}

#[test]
fn crests_and_lanyards_follow_membership_order() {
    let plan = plan_for(&["Corporal", "7RHA", "16CSMR"], &[]);
    assert_eq!(
        image_keys(&plan),
        vec![
            "ranks/corporal",
            "crests/7rha",
            "lanyards/7rha",
            "crests/16csmr",
            "lanyards/16csmr"
        ]
    );
    assert_eq!(plan.lanyard_groups().collect::<Vec<_>>(), vec!["7RHA", "16CSMR"]);
}

#[test]
fn alternate_service_never_wears_lanyards() {
    for rank in ["Aircraftman", "Flight Sergeant", "Pilot Officer", "Flight Lieutenant"] {
        let plan = plan_for(&[rank, "16CSMR", "7RHA"], &[]);
        assert!(
            plan.foregrounds
                .iter()
                .all(|l| !matches!(l.kind, LayerKind::Lanyard { .. })),
            "{rank} must not wear lanyards"
        );
        assert!(image_keys(&plan).contains(&"crests/16csmr"));
    }
}

#[test]
fn leadership_tier_keeps_only_highest() {
    let plan = plan_for(&["Sergeant"], &["FTCC", "PCBC"]);
    assert!(image_keys(&plan).contains(&"quals/pcbc"));
    assert!(!image_keys(&plan).contains(&"quals/ftcc"));
    assert_eq!(award_names(&plan), vec!["PCBC"]);

    let plan = plan_for(&["Sergeant"], &["PCBC", "FTCC"]);
    assert_eq!(award_names(&plan), vec!["PCBC"]);
}

#[test]
fn marksmanship_and_pilot_tiers_are_independent() {
    let plan = plan_for(
        &["Sergeant"],
        &["Marksman", "Basic Wings", "Sharpshooter", "Senior Wings", "FTCC"],
    );
    assert_eq!(
        image_keys(&plan),
        vec![
            "ranks/sergeant",
            "quals/sharpshooter",
            "quals/senior-wings",
            "quals/ftcc"
        ]
    );
}

#[test]
fn restricted_rank_hides_qualification_in_any_order() {
    for badges in [
        vec!["Combat Medic", "Paratrooper"],
        vec!["Paratrooper", "Combat Medic"],
    ] {
        let plan = plan_for(&["Private"], &badges);
        assert!(!image_keys(&plan).contains(&"quals/combat-medic"));
        assert!(image_keys(&plan).contains(&"quals/paratrooper"));
    }
    let plan = plan_for(&["Sergeant"], &["Combat Medic"]);
    assert!(image_keys(&plan).contains(&"quals/combat-medic"));
}

#[test]
fn service_variant_artwork_is_used() {
    let plan = plan_for(&["Flight Sergeant"], &["Paratrooper"]);
    assert_eq!(
        image_keys(&plan),
        vec!["ranks/flight-sergeant", "quals/paratrooper-raf"]
    );
}

#[test]
fn unit_gated_qualification_requires_a_unit_group() {
    let plan = plan_for(&["Sergeant"], &["Pathfinder"]);
    assert!(!image_keys(&plan).contains(&"quals/pathfinder"));

    let plan = plan_for(&["Sergeant", "pathfinder platoon"], &["Pathfinder"]);
    assert!(image_keys(&plan).contains(&"quals/pathfinder"));
}

#[test]
fn group_rule_suppresses_sniper_but_keeps_crest_and_lanyard() {
    let plan = plan_for(&["Corporal", "16CSMR"], &["Sniper"]);
    let keys = image_keys(&plan);
    assert!(!keys.contains(&"quals/sniper"));
    assert!(keys.contains(&"crests/16csmr"));
    assert!(keys.contains(&"lanyards/16csmr"));
    assert!(plan.qualifications.is_empty());

    let plan = plan_for(&["Corporal"], &["Sniper"]);
    assert!(image_keys(&plan).contains(&"quals/sniper"));
}

#[test]
fn badges_are_matched_case_insensitively_and_deduplicated() {
    let plan = plan_for(&["sergeant"], &["paratrooper", "PARATROOPER", "Award 2"]);
    assert_eq!(image_keys(&plan), vec!["ranks/sergeant", "quals/paratrooper"]);
    assert_eq!(award_names(&plan), vec!["Award 2"]);
}

#[test]
fn unresolved_badge_ids_are_dropped() {
    let mut user = UserContext::from_names(["Sergeant"], ["Paratrooper"]);
    user.user_badges.push(crate::select::context::UserBadge { badge_id: 999 });
    let plan = select(&user, &catalog());
    assert_eq!(plan.qualifications.len(), 1);
}

#[test]
fn awards_keep_badge_order_and_unknown_badges_are_ignored() {
    let plan = plan_for(&["Sergeant"], &["Award 3", "Not In Catalog", "Award 1"]);
    assert_eq!(award_names(&plan), vec!["Award 3", "Award 1"]);
    assert_eq!(plan.foregrounds.len(), 1);
}

#[test]
fn no_matches_is_suppressed() {
    let plan = plan_for(&["Book Club"], &["Knitting"]);
    assert!(plan.background.is_none());
    assert!(plan.is_suppressed());
    assert_eq!(plan.groups, vec!["Book Club".to_string()]);
}
