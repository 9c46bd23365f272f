pub struct UserCreateRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
