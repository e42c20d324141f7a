use serde::{Deserialize, Serialize};

/// The three assessment phases, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Assess,
    Implement,
    Monitor,
}

impl Phase {
    pub fn key(&self) -> &'static str {
        match self {
            Phase::Assess => "assess",
            Phase::Implement => "implement",
            Phase::Monitor => "monitor",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Phase::Assess => "Assess",
            Phase::Implement => "Implement",
            Phase::Monitor => "Monitor",
        }
    }

    pub fn all() -> [Phase; 3] {
        [Phase::Assess, Phase::Implement, Phase::Monitor]
    }
}

/// A score band: inclusive range on the 1-10 scale plus its description.
#[derive(Debug, Clone, Copy)]
pub struct ScoreBand {
    pub from: u8,
    pub to: u8,
    pub text: &'static str,
}

/// One scored dimension of the rubric.
#[derive(Debug, Clone)]
pub struct Criterion {
    /// Key under which the answer is submitted (matches the questionnaire field).
    pub key: &'static str,
    /// Human-readable label used for scores/feedback/recommendations maps.
    pub label: &'static str,
    pub question: &'static str,
    pub indicators: &'static [&'static str],
    pub scale: &'static [ScoreBand],
    pub actions: &'static [ScoreBand],
}

impl Criterion {
    pub fn action_for(&self, score: u8) -> Option<&'static str> {
        self.actions
            .iter()
            .find(|band| score >= band.from && score <= band.to)
            .map(|band| band.text)
    }
}

#[derive(Debug, Clone)]
pub struct PhaseRubric {
    pub phase: Phase,
    pub criteria: Vec<Criterion>,
}

/// Static scoring rubric. Built once at startup, shared read-only.
#[derive(Debug, Clone)]
pub struct Rubric {
    phases: Vec<PhaseRubric>,
}

const fn band(from: u8, to: u8, text: &'static str) -> ScoreBand {
    ScoreBand { from, to, text }
}

impl Rubric {
    pub fn new() -> Self {
        Rubric {
            phases: vec![
                PhaseRubric {
                    phase: Phase::Assess,
                    criteria: assess_criteria(),
                },
                PhaseRubric {
                    phase: Phase::Implement,
                    criteria: implement_criteria(),
                },
                PhaseRubric {
                    phase: Phase::Monitor,
                    criteria: monitor_criteria(),
                },
            ],
        }
    }

    pub fn phases(&self) -> &[PhaseRubric] {
        &self.phases
    }

    pub fn criterion(&self, phase: Phase, label: &str) -> Option<&Criterion> {
        self.phases
            .iter()
            .find(|p| p.phase == phase)
            .and_then(|p| p.criteria.iter().find(|c| c.label == label))
    }

    pub fn criterion_by_label(&self, label: &str) -> Option<&Criterion> {
        self.phases
            .iter()
            .flat_map(|p| p.criteria.iter())
            .find(|c| c.label == label)
    }
}

impl Default for Rubric {
    fn default() -> Self {
        Self::new()
    }
}

fn assess_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            key: "marketResearch",
            label: "Market Research Quality",
            question: "How do you currently research your market and category?",
            indicators: &[
                "Primary and secondary research sources are combined",
                "Category size and growth trends are quantified",
                "Research is refreshed on a regular cadence",
            ],
            scale: const { &[
                band(1, 3, "No structured research; decisions rely on intuition or anecdote."),
                band(4, 6, "Occasional ad-hoc research with no consistent methodology or cadence."),
                band(7, 8, "Regular research with defined sources, partially integrated into planning."),
                band(9, 10, "Systematic, multi-source research programme directly driving strategy."),
            ] },
            actions: const { &[
                band(1, 3, "Commission a baseline category study and set up a quarterly research cadence."),
                band(4, 6, "Formalize your research methodology and document sources and assumptions."),
                band(7, 8, "Integrate research outputs into the annual brand planning cycle."),
                band(9, 10, "Maintain the programme and pressure-test assumptions against fresh data yearly."),
            ] },
        },
        Criterion {
            key: "consumerSegmentation",
            label: "Consumer Segmentation",
            question: "How do you segment and prioritize your target consumers?",
            indicators: &[
                "Segments are defined on needs and behaviour, not demographics alone",
                "Priority segments are explicitly chosen and sized",
                "Segment insights inform product and communication decisions",
            ],
            scale: const { &[
                band(1, 3, "No segmentation; the brand addresses everyone the same way."),
                band(4, 6, "Basic demographic segmentation without behavioural depth."),
                band(7, 8, "Needs-based segments defined and partially activated in marketing."),
                band(9, 10, "Sharp, sized, needs-based segmentation steering the whole portfolio."),
            ] },
            actions: const { &[
                band(1, 3, "Run a segmentation study and pick one priority segment to serve first."),
                band(4, 6, "Layer behavioural and attitudinal data onto your demographic segments."),
                band(7, 8, "Activate segment insights in media planning and product roadmaps."),
                band(9, 10, "Review segment sizing annually and retire segments that no longer pay back."),
            ] },
        },
        Criterion {
            key: "competitiveAnalysis",
            label: "Competitive Analysis",
            question: "How do you track and respond to competitors?",
            indicators: &[
                "Direct and indirect competitors are mapped",
                "Competitor positioning and pricing are monitored",
                "White-space opportunities are identified from the analysis",
            ],
            scale: const { &[
                band(1, 3, "Competitors are not tracked in any structured way."),
                band(4, 6, "Occasional competitor reviews triggered by events, not routine."),
                band(7, 8, "Structured competitive map refreshed periodically and shared internally."),
                band(9, 10, "Continuous competitive intelligence feeding positioning and pricing moves."),
            ] },
            actions: const { &[
                band(1, 3, "Build a first competitive map covering direct and indirect players."),
                band(4, 6, "Set a fixed review rhythm and assign ownership for competitor tracking."),
                band(7, 8, "Translate the map into explicit white-space opportunities each cycle."),
                band(9, 10, "Wire competitive signals into pricing and campaign decision-making."),
            ] },
        },
        Criterion {
            key: "problemSolutionFit",
            label: "Problem-Solution Fit",
            question: "How well does your offer solve a real, validated consumer problem?",
            indicators: &[
                "The consumer problem is articulated and validated with evidence",
                "The offer's benefit maps directly onto the problem",
                "Willingness to pay has been tested",
            ],
            scale: const { &[
                band(1, 3, "The problem the brand solves has never been articulated or tested."),
                band(4, 6, "A problem statement exists but validation is thin or dated."),
                band(7, 8, "Validated problem-benefit fit with some willingness-to-pay evidence."),
                band(9, 10, "Continuously validated fit; pricing and proposition tested with consumers."),
            ] },
            actions: const { &[
                band(1, 3, "Write the problem statement and validate it with ten consumer interviews."),
                band(4, 6, "Re-validate the problem with current consumers and refresh the evidence."),
                band(7, 8, "Run a willingness-to-pay test on your core proposition."),
                band(9, 10, "Institutionalize proposition testing before every major launch."),
            ] },
        },
    ]
}

fn implement_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            key: "brandPositioning",
            label: "Brand Positioning Clarity",
            question: "How clearly is your brand positioned against alternatives?",
            indicators: &[
                "A written positioning statement exists and is current",
                "The positioning names a frame of reference and a point of difference",
                "Internal teams can state the positioning consistently",
            ],
            scale: const { &[
                band(1, 3, "No written positioning; messaging varies by whoever produces it."),
                band(4, 6, "A positioning document exists but is stale or not used day to day."),
                band(7, 8, "Current positioning statement guiding most brand outputs."),
                band(9, 10, "Sharp positioning consistently recognizable across every touchpoint."),
            ] },
            actions: const { &[
                band(1, 3, "Draft a one-page positioning statement and socialize it internally."),
                band(4, 6, "Refresh the positioning and brief every team producing brand output."),
                band(7, 8, "Audit recent outputs against the positioning and close the gaps."),
                band(9, 10, "Protect the positioning; revisit only on material market change."),
            ] },
        },
        Criterion {
            key: "visualIdentity",
            label: "Visual Identity System",
            question: "How consistent and distinctive is your visual identity?",
            indicators: &[
                "Distinctive brand assets are defined and documented",
                "Guidelines cover all active channels",
                "Asset usage is audited for consistency",
            ],
            scale: const { &[
                band(1, 3, "No identity guidelines; visual output is improvised per piece."),
                band(4, 6, "Basic logo and colour rules exist but coverage is incomplete."),
                band(7, 8, "Documented identity system applied across most channels."),
                band(9, 10, "Distinctive, codified asset system enforced everywhere the brand appears."),
            ] },
            actions: const { &[
                band(1, 3, "Commission baseline identity guidelines covering logo, colour, and type."),
                band(4, 6, "Extend guidelines to digital and retail touchpoints."),
                band(7, 8, "Run a distinctiveness audit of your brand assets versus competitors."),
                band(9, 10, "Keep the asset system stable; consistency compounds recognition."),
            ] },
        },
        Criterion {
            key: "channelStrategy",
            label: "Channel Strategy",
            question: "How deliberately do you choose and invest in channels?",
            indicators: &[
                "Channel choices trace back to where priority segments actually are",
                "Budget allocation across channels is reviewed against performance",
                "New channels are piloted before scaling",
            ],
            scale: const { &[
                band(1, 3, "Channel presence is historical accident, not a decision."),
                band(4, 6, "Channels chosen by habit; budget split rarely revisited."),
                band(7, 8, "Channel mix reviewed annually against segment reach and cost."),
                band(9, 10, "Dynamic channel portfolio steered by measured reach and conversion."),
            ] },
            actions: const { &[
                band(1, 3, "Map where your priority segment spends attention and match channels to it."),
                band(4, 6, "Introduce an annual channel-mix review with reallocation authority."),
                band(7, 8, "Pilot one new channel per year with explicit success criteria."),
                band(9, 10, "Automate channel performance reporting and rebalance quarterly."),
            ] },
        },
        Criterion {
            key: "messagingConsistency",
            label: "Messaging Consistency",
            question: "How consistent is your messaging across touchpoints and time?",
            indicators: &[
                "A messaging hierarchy exists (core message, proof points, tone)",
                "Campaigns ladder up to the same core message",
                "Tone of voice is documented and followed",
            ],
            scale: const { &[
                band(1, 3, "Every campaign invents its own message and tone."),
                band(4, 6, "A core message exists but execution drifts frequently."),
                band(7, 8, "Messaging hierarchy followed in most campaigns."),
                band(9, 10, "One recognizable message system sustained across years and channels."),
            ] },
            actions: const { &[
                band(1, 3, "Write a one-page messaging hierarchy and require briefs to reference it."),
                band(4, 6, "Add a messaging check to campaign sign-off."),
                band(7, 8, "Audit the last year of campaigns for drift and correct course."),
                band(9, 10, "Resist novelty; evolve executions while keeping the core message fixed."),
            ] },
        },
    ]
}

fn monitor_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            key: "brandTracking",
            label: "Brand Tracking Discipline",
            question: "How do you measure brand health over time?",
            indicators: &[
                "Awareness, consideration, and preference are tracked on a cadence",
                "Tracking is comparable wave over wave",
                "Results feed back into strategy decisions",
            ],
            scale: const { &[
                band(1, 3, "Brand health is not measured at all."),
                band(4, 6, "Sporadic measurement with incomparable methods between waves."),
                band(7, 8, "Regular tracker in place; results reviewed but loosely acted on."),
                band(9, 10, "Continuous comparable tracking with explicit decision triggers."),
            ] },
            actions: const { &[
                band(1, 3, "Stand up a simple twice-yearly brand tracker on awareness and preference."),
                band(4, 6, "Fix the methodology so waves become comparable."),
                band(7, 8, "Attach explicit decisions to tracker thresholds."),
                band(9, 10, "Keep the tracker stable and resist metric churn."),
            ] },
        },
        Criterion {
            key: "customerFeedback",
            label: "Customer Feedback Loop",
            question: "How do you collect and act on customer feedback?",
            indicators: &[
                "Feedback is collected systematically across touchpoints",
                "Feedback reaches the teams who can act on it",
                "Closed-loop follow-up exists for detractors",
            ],
            scale: const { &[
                band(1, 3, "Feedback arrives only as unsolicited complaints."),
                band(4, 6, "Feedback is collected but sits unread or unrouted."),
                band(7, 8, "Structured collection with routing to owning teams."),
                band(9, 10, "Closed-loop system where feedback demonstrably changes the offer."),
            ] },
            actions: const { &[
                band(1, 3, "Add a post-purchase feedback prompt and route responses to one owner."),
                band(4, 6, "Create a monthly feedback digest for product and marketing."),
                band(7, 8, "Close the loop: respond to detractors within a week."),
                band(9, 10, "Publish the changes feedback produced; it raises response rates."),
            ] },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_criterion_covers_the_full_scale() {
        let rubric = Rubric::new();
        for phase in rubric.phases() {
            for criterion in &phase.criteria {
                for score in 1..=10u8 {
                    let in_scale = criterion
                        .scale
                        .iter()
                        .any(|b| score >= b.from && score <= b.to);
                    assert!(in_scale, "{} has no scale text for {}", criterion.label, score);
                    assert!(
                        criterion.action_for(score).is_some(),
                        "{} has no action for {}",
                        criterion.label,
                        score
                    );
                }
            }
        }
    }

    #[test]
    fn lookup_by_phase_and_label() {
        let rubric = Rubric::new();
        let c = rubric
            .criterion(Phase::Assess, "Market Research Quality")
            .unwrap();
        assert_eq!(c.key, "marketResearch");
        assert!(rubric.criterion(Phase::Monitor, "Market Research Quality").is_none());
        assert!(rubric.criterion_by_label("Customer Feedback Loop").is_some());
    }

    #[test]
    fn phase_counts_match_the_questionnaire() {
        let rubric = Rubric::new();
        let counts: Vec<usize> = rubric.phases().iter().map(|p| p.criteria.len()).collect();
        assert_eq!(counts, vec![4, 4, 2]);
    }
}
