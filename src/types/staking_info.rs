use serde::Deserialize;

/// Chain-wide staking economics as reported by `getstakinginfo`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StakingInfo {
    #[serde(rename = "moneysupply")]
    pub money_supply: f64,
    #[serde(rename = "percentyearreward")]
    pub percent_year_reward: f64,
    #[serde(
        rename = "treasurydonationpercent",
        alias = "foundationdonationpercent"
    )]
    pub treasury_donation_percent: f64,
    #[serde(rename = "netstakeweight")]
    pub net_stake_weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_staking_info() {
        let json = r#"{
            "enabled": true,
            "staking": true,
            "errors": "",
            "percentyearreward": 5.0,
            "moneysupply": 9876543.21,
            "reserve": 0.0,
            "wallettreasurydonationpercent": 0,
            "treasurydonationpercent": 10,
            "currentblocksize": 1000,
            "netstakeweight": 512345678901234,
            "weight": 100000000,
            "expectedtime": 3600
        }"#;

        let info: StakingInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.percent_year_reward, 5.0);
        assert_eq!(info.money_supply, 9876543.21);
        assert_eq!(info.treasury_donation_percent, 10.0);
        assert_eq!(info.net_stake_weight, 512345678901234.0);
    }

    #[test]
    fn test_decode_legacy_donation_field() {
        let json = r#"{
            "percentyearreward": 2.0,
            "moneysupply": 100.0,
            "foundationdonationpercent": 50,
            "netstakeweight": 1
        }"#;

        let info: StakingInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.treasury_donation_percent, 50.0);
    }
}
