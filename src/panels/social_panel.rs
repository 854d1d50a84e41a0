use std::time::Duration;

use crate::PaintApp;
use crate::social::client::Screen;
use crate::social::compose::MAX_TWEET_CHARS;
use crate::social::{OAuthProvider, SocialClient, Tweet, User};
use crate::util::time::{current_time_secs, now_millis, relative_time};

pub fn social_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::right("social_panel")
        .resizable(true)
        .default_width(300.0)
        .show(ctx, |ui| {
            let social = &mut app.social;
            ui.heading("Timeline");

            if let Some(notice) = social.notice().map(str::to_owned) {
                ui.horizontal(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, notice);
                    if ui.small_button("✖").clicked() {
                        social.dismiss_notice();
                    }
                });
            }

            let Some(user) = social.user().cloned() else {
                login_form(ui, social);
                ui.separator();
                feed(ui, social, None);
                return;
            };

            account_bar(ui, social, &user);
            ui.separator();
            match social.screen {
                Screen::Home => {
                    composer(ui, ctx, social);
                    ui.separator();
                    feed(ui, social, Some(&user));
                }
                Screen::Profile => profile(ui, social, &user),
            }
        });
}

fn login_form(ui: &mut egui::Ui, social: &mut SocialClient) {
    let form = &mut social.login;
    ui.checkbox(&mut form.creating, "Create a new account");
    egui::Grid::new("login_grid").num_columns(2).show(ui, |ui| {
        if form.creating {
            ui.label("Name");
            ui.text_edit_singleline(&mut form.name);
            ui.end_row();
        }
        ui.label("Email");
        ui.text_edit_singleline(&mut form.email);
        ui.end_row();
        ui.label("Password");
        ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
        ui.end_row();
    });

    let caption = if form.creating { "Create account" } else { "Log in" };
    ui.horizontal(|ui| {
        if ui.button(caption).clicked() {
            social.submit_login();
        }
        if ui.button(OAuthProvider::GitHub.label()).clicked() {
            social.sign_in_with(OAuthProvider::GitHub);
        }
    });
    if let Some(err) = social.auth_error() {
        ui.colored_label(ui.visuals().error_fg_color, err);
    }
}

fn account_bar(ui: &mut egui::Ui, social: &mut SocialClient, user: &User) {
    ui.horizontal(|ui| {
        let avatar = if user.photo_url.is_some() { "🖼" } else { "👤" };
        ui.label(format!("{avatar} {}", user.name_or_anonymous()));
        if ui.small_button("Log out").clicked() {
            social.sign_out();
        }
    });
    ui.horizontal(|ui| {
        let mut screen = social.screen;
        ui.selectable_value(&mut screen, Screen::Home, "Home");
        ui.selectable_value(&mut screen, Screen::Profile, "Profile");
        if screen != social.screen {
            social.show(screen);
        }
    });
}

fn composer(ui: &mut egui::Ui, ctx: &egui::Context, social: &mut SocialClient) {
    ui.add(
        egui::TextEdit::multiline(&mut social.composer.text)
            .hint_text("What is happening?!")
            .desired_rows(3)
            .char_limit(MAX_TWEET_CHARS),
    );

    ui.horizontal(|ui| {
        let remaining = social.composer.remaining_chars();
        ui.small(format!("{remaining} left"));
        if let Some(photo) = social.composer.photo().map(|photo| photo.name.clone()) {
            ui.small(format!("📷 {photo}"));
            if ui.small_button("Remove").clicked() {
                social.composer.clear_photo();
            }
        }
    });

    ui.horizontal(|ui| {
        let label = if social.composer.is_posting() { "Posting..." } else { "Tweet" };
        if ui
            .add_enabled(!social.composer.is_posting(), egui::Button::new(label))
            .clicked()
        {
            social.post();
        }
        if let Some(message) = social.composer.success_message(current_time_secs()) {
            ui.label(message);
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    });
    if let Some(err) = social.composer.error() {
        ui.colored_label(ui.visuals().error_fg_color, err);
    }
}

fn feed(ui: &mut egui::Ui, social: &mut SocialClient, user: Option<&User>) {
    let tweets: Vec<Tweet> = social.timeline().feed().into_iter().cloned().collect();
    let mut delete = None;
    egui::ScrollArea::vertical()
        .id_salt("feed_scroll")
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            if tweets.is_empty() {
                ui.weak("No tweets yet");
            }
            for tweet in &tweets {
                if tweet_row(ui, tweet, user) {
                    delete = Some(tweet.clone());
                }
            }
        });
    if let Some(tweet) = delete {
        social.delete(&tweet);
    }

    let timeline = social.timeline();
    let (pages, current, loading) = (timeline.page_count(), timeline.current_page(), timeline.is_loading());
    let error = timeline.error().map(str::to_owned);
    ui.horizontal_wrapped(|ui| {
        for index in 0..pages {
            if ui.selectable_label(index == current, format!("{}", index + 1)).clicked() {
                social.go_to_page(index);
            }
        }
        if loading {
            ui.spinner();
        }
    });
    if let Some(err) = error {
        ui.colored_label(ui.visuals().error_fg_color, err);
    }
}

fn profile(ui: &mut egui::Ui, social: &mut SocialClient, user: &User) {
    ui.label(format!("Tweets by {}", user.name_or_anonymous()));
    ui.small("Drop an image with \"Avatar\" selected to change your photo");
    let tweets: Vec<Tweet> = social.profile().tweets().to_vec();
    let mut delete = None;
    egui::ScrollArea::vertical()
        .id_salt("profile_scroll")
        .show(ui, |ui| {
            if social.profile().is_loading() {
                ui.spinner();
            }
            for tweet in &tweets {
                if tweet_row(ui, tweet, Some(user)) {
                    delete = Some(tweet.clone());
                }
            }
        });
    if let Some(tweet) = delete {
        social.delete(&tweet);
    }
}

/// Draws one tweet; returns true when its delete button was clicked
fn tweet_row(ui: &mut egui::Ui, tweet: &Tweet, user: Option<&User>) -> bool {
    let mut delete = false;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.strong(&tweet.username);
            ui.weak(relative_time(tweet.created_at, now_millis()));
            if tweet.can_delete(user) && ui.small_button("🗑").on_hover_text("Delete").clicked() {
                delete = true;
            }
        });
        ui.label(&tweet.tweet);
        if tweet.photo.is_some() {
            ui.weak("📷 photo");
        }
    });
    delete
}
