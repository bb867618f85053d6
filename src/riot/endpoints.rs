//! Request targets for every resource the crate reads.
//!
//! Summoner and league data live on the regional host (`euw1.api...`), match
//! data on the continental host (`europe.api...`). Asking a host of the wrong
//! tier for a resource is answered with a 4xx, so the split below is fixed.

use super::region::classify_region;

const RIOT_API_DOMAIN: &str = "api.riotgames.com";
const API_VERSION: &str = "v1";

/// Resource kinds, each carrying the identifier it is addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<'a> {
    SummonerByName(&'a str),
    SummonerEntries(&'a str),
    SummonerById(&'a str),
    MatchIdsByPuuid(&'a str),
    MatchById(&'a str),
    ChallengerList,
}

impl Resource<'_> {
    pub fn is_match_scoped(&self) -> bool {
        matches!(self, Self::MatchIdsByPuuid(_) | Self::MatchById(_))
    }
}

/// Builds the fully-qualified URL of `resource` for `region`.
pub fn resolve(resource: Resource<'_>, region: &str) -> String {
    let host = if resource.is_match_scoped() {
        continental_host(region)
    } else {
        regional_host(region)
    };

    let path = match resource {
        Resource::SummonerByName(name) => format!(
            "tft/summoner/{API_VERSION}/summoners/by-name/{}",
            urlencoding::encode(name)
        ),
        Resource::SummonerEntries(summoner_id) => {
            format!("tft/league/{API_VERSION}/entries/by-summoner/{summoner_id}")
        }
        Resource::SummonerById(summoner_id) => {
            format!("tft/summoner/{API_VERSION}/summoners/{summoner_id}")
        }
        Resource::MatchIdsByPuuid(puuid) => {
            format!("tft/match/{API_VERSION}/matches/by-puuid/{puuid}/ids")
        }
        Resource::MatchById(match_id) => format!("tft/match/{API_VERSION}/matches/{match_id}"),
        Resource::ChallengerList => format!("tft/league/{API_VERSION}/challenger"),
    };

    format!("{host}/{path}")
}

fn regional_host(region: &str) -> String {
    format!("https://{}.{RIOT_API_DOMAIN}", region.trim().to_lowercase())
}

fn continental_host(region: &str) -> String {
    format!("https://{}.{RIOT_API_DOMAIN}", classify_region(region))
}
