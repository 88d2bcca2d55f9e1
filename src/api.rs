use rocket::Route;

mod answer;
mod survey;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(survey::routes());
    routes.extend(answer::routes());
    routes
}
