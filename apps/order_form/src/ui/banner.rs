use eframe::egui::Color32;
use shared::domain::SubmissionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banner {
    pub text: &'static str,
    pub color: Color32,
}

pub fn status_banner(status: SubmissionStatus) -> Option<Banner> {
    match status {
        SubmissionStatus::Idle => None,
        SubmissionStatus::Submitting => Some(Banner {
            text: "Submitting…",
            color: Color32::from_rgb(0x8a, 0xb4, 0xf8),
        }),
        SubmissionStatus::Success => Some(Banner {
            text: "Submitted. The return workflow has started.",
            color: Color32::from_rgb(0x3b, 0xa5, 0x5d),
        }),
        SubmissionStatus::Error => Some(Banner {
            text: "Submission failed. Check order number, status and store, then try again.",
            color: Color32::from_rgb(0xed, 0x42, 0x45),
        }),
    }
}

pub fn submit_label(status: SubmissionStatus) -> &'static str {
    if status == SubmissionStatus::Submitting {
        "Submitting…"
    } else {
        "Submit"
    }
}
