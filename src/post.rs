use crate::gig::Gig;

pub const SUBREDDIT: &str = "livemusicmelbourne";
pub const TITLE: &str = "Today's gigs";

/// Reddit's kind for a text post.
pub const KIND: &str = "self";

pub const FOOTER: &str = "Live Music Locator is a not-for-profit service designed to make it \
                          possible to discover every gig playing at every venue across every \
                          genre at any one time. This information will always be verified and \
                          free, importantly supporting musicians, our small to medium live music \
                          venues, and you the punters. More detailed gig information here: \
                          https://lml.live/?dateRange=today";

/// One line per gig separated by blank lines, then the footer.
///
/// Expects at least one gig; callers handle the empty day themselves.
pub fn body(gigs: &[Gig]) -> String {
  gigs.iter()
      .fold(String::new(), |body, gig| body + &gig.to_reddit_s() + "\n\n")
      + FOOTER
}
