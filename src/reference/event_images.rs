use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventImage {
    pub event_type: &'static str,
    pub image: &'static str,
}

pub const FALLBACK_IMAGE: &str = "/images/events/generic.jpg";

pub const EVENT_IMAGES: &[EventImage] = &[
    EventImage { event_type: "boda", image: "/images/events/boda.jpg" },
    EventImage { event_type: "cumpleanos", image: "/images/events/cumpleanos.jpg" },
    EventImage { event_type: "corporativo", image: "/images/events/corporativo.jpg" },
    EventImage { event_type: "quinceanero", image: "/images/events/quinceanero.jpg" },
    EventImage { event_type: "bautizo", image: "/images/events/bautizo.jpg" },
];

/// Image for an event type (case-insensitive), generic image otherwise
pub fn image_for_event(event_type: &str) -> &'static str {
    let wanted = event_type.trim().to_lowercase();
    EVENT_IMAGES
        .iter()
        .find(|e| e.event_type == wanted)
        .map(|e| e.image)
        .unwrap_or(FALLBACK_IMAGE)
}
