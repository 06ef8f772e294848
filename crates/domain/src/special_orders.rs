//! Tamer Special Orders reference table.
//!
//! Three orders per attribute, unlocked when the attribute total reaches
//! 5, 6 and 7.

use serde::Serialize;

use crate::sheets::tamer::AttributeKey;

/// Lowest attribute level that unlocks an order.
pub const MIN_ORDER_LEVEL: i32 = 5;
/// Highest order level in the table.
pub const MAX_ORDER_LEVEL: i32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOrder {
    pub attribute: AttributeKey,
    pub level: i32,
    pub name: &'static str,
    /// How often the order can be used, e.g. "1/Round" or "Passive".
    #[serde(rename = "type")]
    pub usage: &'static str,
    pub description: &'static str,
}

impl SpecialOrder {
    /// Stable id in `ATTR-level` form, e.g. `INT-6`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.attribute, self.level)
    }
}

const fn order(
    attribute: AttributeKey,
    level: i32,
    name: &'static str,
    usage: &'static str,
    description: &'static str,
) -> SpecialOrder {
    SpecialOrder {
        attribute,
        level,
        name,
        usage,
        description,
    }
}

/// Ordered by attribute, then level.
pub static SPECIAL_ORDERS: [SpecialOrder; 15] = [
    order(
        AttributeKey::Agi,
        5,
        "FULL SPEED AHEAD",
        "1/Round",
        "[2 ACTIONS] The Tamer helps their Digimon increase their momentum. The Digimon gains 1 extra Action, which must be used to take the Move or Difficult Move Action.",
    ),
    order(
        AttributeKey::Agi,
        6,
        "DON'T LEAVE ANY OPENINGS",
        "Passive",
        "The Tamer can inspire a burst of speed in your Digimon. Your Digimon gains 2 extra Actions, and is treated as if it was a different round for the purpose of bypassing rules (such as one Attack per Round). This means a Digimon can take both of its Actions, and by using this Special Order it gets a second turn in the same round.",
    ),
    order(
        AttributeKey::Agi,
        7,
        "FINISH IT NOW",
        "1/Rest",
        "[2 ACTIONS] The Tamer can inspire a burst of speed in your Digimon. Your Digimon gains 2 extra Actions, and is treated as if it was a different round for the purpose of bypassing rules (such as one Attack per Round). This means a Digimon can take both of its Actions, and by using this Special Order it gets a second turn in the same round.",
    ),
    order(
        AttributeKey::Bod,
        5,
        "DON'T WORRY, YOU'LL HEAL",
        "Passive",
        "You gain +2 wound boxes permanently. Additionally, you recover from physical ailments (poison, disease, exhaustion) twice as fast as normal.",
    ),
    order(
        AttributeKey::Bod,
        6,
        "YOU CAN TAKE IT",
        "1/Combat",
        "[FREE INTERRUPT ACTION] When the Digimon is brought to 0 Wound Boxes, the Tamer makes a Pool Check using Body. The Digimon regains missing Wound Boxes equal to the number of successes + the Digimon’s Stage and isn’t Defeated, remaining at its current Stage.",
    ),
    order(
        AttributeKey::Bod,
        7,
        "I'M WITH YOU",
        "1/Rest",
        "[1 ACTION] The Tamer may declare this Special Order after its Digimon rolls Accuracy for an Attack. Any 4s that were rolled for this Attack now act as Successes towards their Digimon’s Accuracy Check. NOTE: This Special Order can be used as an Interrupt Action if the Attack is also made as an Interrupt Action (such as Counterattack).",
    ),
    order(
        AttributeKey::Cha,
        5,
        "HEY YOU",
        "UNLIMITED",
        "[1 ACTION] The Tamer and a willing ally Digimon work together to rattle up an enemy. [TAUNT] is now in effect for 3 rounds. [TAUNT]is applied to one Enemy, and the recipient (the willing Digimon) automatically receives aggro based on their CPU, as per normal [TAUNT] rules. This Special Order cannot be used again until [TAUNT] wears off or is removed.",
    ),
    order(
        AttributeKey::Cha,
        6,
        "I BELIEVE IN YOU",
        "1/Session",
        "The Tamer rallies a willing Ally Digimon. The Digimon gains the [BASTION 2] Effect from their Tamer, which lasts until the start of the Tamer’s next turn. NOTE: [BASTION] is a Positive Effect that grants a bonus equal to the Digimon's primary Stats (except Health) based on its value.",
    ),
    order(
        AttributeKey::Cha,
        7,
        "WAKE UP, DON'T QUIT NOW",
        "1/Rest",
        "[2 ACTIONS] This Order can only be Activated when your Digimon has 0 Wound Boxes or has dropped to its Default Stage after being Defeated. The Digimon returns to the Stage it was at when it was Defeated, and the Tamer must make a Charisma Check with a TN of 12 + the Digimon’s Stage. On a Critical Failure or Failure, the Digimon will revive with 1 Wound Box. On a Success, the Digimon revives with an amount of Wound Boxes equal to its Stage + 1. On a Critical Success, the Digimon will revive with half of their Wound Box Maximum regained or Stage +1 (whichever is higher).",
    ),
    order(
        AttributeKey::Int,
        5,
        "I'VE CALCULATED THE ODDS",
        "1/Round",
        "When the Tamer or its Digimon would take the Bolster Action, instead of gaining +2 Dice to a Pool Check, you can choose to instead gain +1 Success on the result.",
    ),
    order(
        AttributeKey::Int,
        6,
        "TIME FOR PLAN B",
        "1/Combat",
        "[FREE ACTION] When the Tamer's Digimon would make an Attack, the Digimon can treat it as its Signature Move if it wasn’t already. This grants the Attack all the benefits of Signature Move and expends Battery like normal. After the Attack is made, the effects of this Special Order end and it becomes a regular Attack again.",
    ),
    order(
        AttributeKey::Int,
        7,
        "I'VE FOUND AN EXPLOIT",
        "1/Session",
        "The Tamer inflicts [DEBILITATE] on one Enemy Digimon with a Potency equal to its Stage until the start of the Tamer’s next turn. If multiple [DEBILITATE] debuffs are called, they do not stack with one another [DEBILITATE] is a Negative Effect that causes the Digimon to suffer a penalty to all stats except Health equal to its Potency.",
    ),
    order(
        AttributeKey::Wil,
        5,
        "TOUGH IT OUT",
        "1/Round",
        "Out of sheer willpower, the Tamer’s Digimon is cured from one Negative Effect that was plaguing them as if they used [CLEANSE].",
    ),
    order(
        AttributeKey::Wil,
        6,
        "NEVER BACK DOWN",
        "1/COMBAT",
        "When Initiative is rolled, the Tamer makes a Willpower Pool Check. Their Digimon gains Temporary Wound Boxes equal to the number of Successes + the highest stage among all enemies present (to a max of 5).  These Temporary Wound Boxes stack with other sources (and are always removed first in that scenario). These last until the end of Combat.",
    ),
    order(
        AttributeKey::Wil,
        7,
        "Miracle",
        "1/Session",
        "Through sheer force of willpower, the tamer gains total narrative control of a roll. By spending 7 IP the Tamer may add or subtract a bonus Willpower + 5 to a Skill Check, or Dodge or Accuracy Pool. Then they may set the results of each die rolled. If you want nothing but 6’s? That’s fine. 1’s all around? That’s your choice as a Player. You cannot use Temporary IP for this Tamer Talent.",
    ),
];

/// The order unlocked at exactly `level` for `attribute`, if any.
pub fn special_order(attribute: AttributeKey, level: i32) -> Option<&'static SpecialOrder> {
    SPECIAL_ORDERS
        .iter()
        .find(|order| order.attribute == attribute && order.level == level)
}

/// All orders for one attribute, by level.
pub fn attribute_orders(attribute: AttributeKey) -> Vec<&'static SpecialOrder> {
    SPECIAL_ORDERS
        .iter()
        .filter(|order| order.attribute == attribute)
        .collect()
}

/// Orders unlocked by the given attribute levels: every level from 5 up to
/// `min(level, 7)` inclusive. Sorted by attribute, then level.
pub fn available_orders(levels: &[(AttributeKey, i32)]) -> Vec<&'static SpecialOrder> {
    let mut orders: Vec<&'static SpecialOrder> = levels
        .iter()
        .flat_map(|(attribute, level)| {
            (MIN_ORDER_LEVEL..=(*level).min(MAX_ORDER_LEVEL))
                .filter_map(move |required| special_order(*attribute, required))
        })
        .collect();
    orders.sort_by_key(|order| (order.attribute, order.level));
    orders.dedup_by_key(|order| (order.attribute, order.level));
    orders
}

/// Keeps the owned order ids that the current levels still unlock.
///
/// Ids are `ATTR-level`. An attribute missing from `levels` counts as 0, and
/// malformed ids are dropped.
pub fn retain_earned(levels: &[(AttributeKey, i32)], owned: &[String]) -> Vec<String> {
    owned
        .iter()
        .filter(|id| {
            let Some((attribute, required)) = id.split_once('-') else {
                return false;
            };
            let Ok(required) = required.parse::<i32>() else {
                return false;
            };
            let current = attribute
                .parse::<AttributeKey>()
                .ok()
                .and_then(|key| {
                    levels
                        .iter()
                        .find(|(attr, _)| *attr == key)
                        .map(|(_, level)| *level)
                })
                .unwrap_or(0);
            current >= required
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_three_tiers_per_attribute() {
        for attribute in AttributeKey::ALL {
            let orders = attribute_orders(attribute);
            let levels: Vec<i32> = orders.iter().map(|order| order.level).collect();
            assert_eq!(levels, vec![5, 6, 7]);
        }
    }

    #[test]
    fn lookup_by_attribute_and_level() {
        let order = special_order(AttributeKey::Wil, 7).unwrap();
        assert_eq!(order.name, "Miracle");
        assert_eq!(order.id(), "WIL-7");
        assert!(special_order(AttributeKey::Wil, 4).is_none());
        assert!(special_order(AttributeKey::Wil, 8).is_none());
    }

    #[test]
    fn level_six_int_unlocks_five_and_six_only() {
        let orders = available_orders(&[(AttributeKey::Int, 6), (AttributeKey::Agi, 4)]);
        let ids: Vec<String> = orders.iter().map(|order| order.id()).collect();
        assert_eq!(ids, vec!["INT-5", "INT-6"]);
    }

    #[test]
    fn levels_above_seven_cap_at_seven() {
        let orders = available_orders(&[(AttributeKey::Bod, 12)]);
        assert_eq!(orders.len(), 3);
    }

    #[test]
    fn available_orders_sorted_by_attribute() {
        let orders = available_orders(&[(AttributeKey::Wil, 5), (AttributeKey::Agi, 5)]);
        let ids: Vec<String> = orders.iter().map(|order| order.id()).collect();
        assert_eq!(ids, vec!["AGI-5", "WIL-5"]);
    }

    #[test]
    fn retain_earned_drops_lost_orders() {
        let owned = vec![
            "AGI-5".to_string(),
            "AGI-7".to_string(),
            "CHA-5".to_string(),
            "bogus".to_string(),
        ];
        let kept = retain_earned(&[(AttributeKey::Agi, 6)], &owned);
        assert_eq!(kept, vec!["AGI-5".to_string()]);
    }

    #[test]
    fn serializes_usage_as_type() {
        let json = serde_json::to_value(special_order(AttributeKey::Cha, 5).unwrap()).unwrap();
        assert_eq!(json["type"], "UNLIMITED");
        assert_eq!(json["attribute"], "CHA");
    }
}
